use lazy_static::lazy_static;
use missions::MissionCatalog;

pub use labsim_protocol as protocol;

pub mod about;
pub mod engine;
pub mod missions;
pub mod primer;
pub mod scoring;
pub mod sequence;

lazy_static! {
    // Built-in reference protocols
    pub static ref MISSIONS: MissionCatalog = MissionCatalog::default();
}
