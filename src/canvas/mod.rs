//! Canvas editor core: the element/state model of the thumbnail studio.
//!
//! This module owns everything that happens between a pointer event and a
//! stored document mutation: the element tagged union, the ordered document
//! (whose collection index is the z-order), the pure geometry used during
//! drag and resize, the gesture state machine, and the projection from
//! normalized geometry to display styling.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`element`] | Element tagged union, per-variant props, sparse patch |
//! | [`doc`] | Ordered document: z-order, selection, background |
//! | [`geometry`] | Pure move/resize math and viewport conversions |
//! | [`session`] | Pointer gesture state machine and keyboard handling |
//! | [`placement`] | Projection to absolute display styling |
//! | [`consts`] | Shared numeric constants (canvas size, resize floor) |

pub mod consts;
pub mod doc;
pub mod element;
pub mod geometry;
pub mod placement;
pub mod session;
