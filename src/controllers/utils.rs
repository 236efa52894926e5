use crate::{prelude::*, session::SharedSession};

use tower_sessions::Session;

const SID_KEY: &str = "sid";

/// Stable id of the browser session. Storing it also makes the session cookie stick.
pub fn session_id(session: &Session) -> Result<String> {
    if let Some(sid) = session.get::<String>(SID_KEY)? {
        return Ok(sid);
    }

    let sid = session.id().0.to_string();
    session.insert(SID_KEY, sid.clone())?;

    return Ok(sid);
}

pub async fn inventory_session(state: &AppState, session: &Session) -> Result<SharedSession> {
    let sid = session_id(session)?;

    return Ok(state.sessions.session(&sid).await);
}
