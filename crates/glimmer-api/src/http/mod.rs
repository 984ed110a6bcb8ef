//! The same-origin CORS relay server.
//!
//! A pass-through forwarder that lets a browser front-end reach the remote
//! generative API without tripping cross-origin restrictions. It carries no
//! logic of its own: the upstream status and body are returned unchanged.

pub mod relay;
pub mod router;
