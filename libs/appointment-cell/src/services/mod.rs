pub mod booking;
pub mod diagnosis;
pub mod records;

pub use booking::AppointmentBookingService;
pub use diagnosis::DiagnosisService;
pub use records::AppointmentRecords;
