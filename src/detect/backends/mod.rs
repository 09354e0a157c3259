#[cfg(feature = "backend-opencv")]
mod opencv;
mod stub;

#[cfg(feature = "backend-opencv")]
pub use opencv::{FaceCascadeBackend, HogPeopleBackend};
pub use stub::StubBackend;
