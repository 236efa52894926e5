use tower_sessions::{cookie::SameSite, Expiry, MokaStore, SessionManagerLayer};

const SESSION_CACHE_CAPACITY: u64 = 2000;

/// Browser sessions live in memory only; they carry the selected game and the theme preference.
pub fn init_session_layer() -> SessionManagerLayer<MokaStore> {
    let store = MokaStore::new(Some(SESSION_CACHE_CAPACITY));

    return SessionManagerLayer::new(store)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(false)
        .with_same_site(SameSite::Lax);
}
