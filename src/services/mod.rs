/// Background task writing the judging clock back to storage.
pub mod clock_backup;
/// Pause, resume, reset and backup of the authoritative judging clock.
pub mod clock_service;
/// Reads and partial updates of the options record.
pub mod options_service;
/// Hook into project group redistribution.
pub mod reassign;
/// Options store connection and health coordinator.
pub mod storage_supervisor;
