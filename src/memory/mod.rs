//! Memory access primitives for kernel code
//!
//! Only reads live here: allocation is an external collaborator (an opaque
//! acquire/release capability owned by the host runtime), and writes go
//! through [`crate::atomic`] when they race.

pub mod load;

pub use load::{load_vec2, load_vec4, CacheHint, Ld, LdAuto, LdCa, LdCg, LdNc, LoadPolicy};
