pub mod records;

pub use records::HealthRecordService;
