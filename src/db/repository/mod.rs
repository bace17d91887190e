pub mod case_record;
pub mod remedy;
pub mod rubric;
pub mod symptom;

pub use case_record::*;
pub use remedy::*;
pub use rubric::*;
pub use symptom::*;
