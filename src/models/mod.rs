pub mod case;
pub mod enums;
pub mod remedy;
pub mod rubric;
pub mod symptom;

pub use case::*;
pub use remedy::*;
pub use rubric::*;
pub use symptom::*;
