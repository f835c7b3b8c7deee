/// Partial options update requests.
pub mod options;
/// Field validators shared by request DTOs.
pub mod validation;
