//! # OmniPlan Output
//!
//! Writes a [`Scenario`](crate::domain::Scenario) as an OmniPlan v2 XML
//! document.
//!
//! ## Document Layout
//!
//! ```text
//! <scenario xmlns=... xmlns:opns=... id=...>
//!   <granularity>days</granularity>
//!   <top-resource idref=.../>
//!   <resource>...</resource>*
//!   <top-task idref=.../>
//!   <task>...</task>*
//!   <critical-path root="-1" enabled="false" resources="false">
//!     <color space="srgb" r="1" g="0.5" b="0.5"/>
//!   </critical-path>
//! </scenario>
//! ```
//!
//! Element order matters to OmniPlan even though XML does not require it.

mod serializer;

pub use serializer::{serialize, serialize_to_string, SerializeError, NAMESPACE};
