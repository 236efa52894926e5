mod checked;
pub use checked::*;

mod photo;
pub use photo::*;

mod game;
pub use game::*;

mod evaluation;
pub use evaluation::*;

mod validation;
pub use validation::*;
