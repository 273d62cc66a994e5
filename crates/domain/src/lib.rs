//! Domain types for the school risk, prioritisation and budget pipeline.

pub mod academic_year;
pub mod enums;
pub mod error;
pub mod panel;
pub mod school;

pub use academic_year::{AcademicYear, AcademicYearParseError};
pub use enums::*;
pub use error::EngineError;
pub use panel::PanelRow;
pub use school::*;
