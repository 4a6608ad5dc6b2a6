pub mod lowercase;
pub mod ascii_fold;
pub mod acronym;
