//! # zkpipe-backend — Proving-System Tool Boundary
//!
//! Defines the trait-based boundary between the pipeline and the external
//! proving-system tool, plus the two implementations the workspace ships:
//!
//! - **Traits** (`traits.rs`): the `ProvingBackend` trait covers the
//!   tool's operation set — witness computation, key derivation, ceremony
//!   contribution, verification-key export, proving, verification, and
//!   verifier-contract export. The trait is the compile-time contract
//!   that keeps the subprocess implementation and the test mock
//!   interchangeable.
//!
//! - **Snarkjs** (`snarkjs.rs`): `SnarkjsBackend` shells out to a
//!   snarkjs-compatible CLI. Proof payloads are treated as opaque files;
//!   this crate never inspects them.
//!
//! - **Mock** (`mock.rs`): `MockBackend` produces deterministic
//!   hash-based artifacts so the full pipeline round-trips hermetically
//!   in tests. It provides **no zero-knowledge guarantees**.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkpipe-core` internally.
//! - No `unsafe` code.

pub mod error;
pub mod mock;
pub mod snarkjs;
pub mod traits;

pub use error::BackendError;
pub use mock::MockBackend;
pub use snarkjs::SnarkjsBackend;
pub use traits::ProvingBackend;
