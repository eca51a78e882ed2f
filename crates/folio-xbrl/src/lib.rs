#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! XBRL parsing for filing documents.
//!
//! # Example
//!
//! ```
//! use folio_xbrl::parse_instance;
//!
//! let xml = r#"<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
//!                          xmlns:us-gaap="http://fasb.org/us-gaap/2023">
//!   <xbrli:context id="FY23">
//!     <xbrli:entity><xbrli:identifier scheme="http://www.sec.gov/CIK">1</xbrli:identifier></xbrli:entity>
//!     <xbrli:period><xbrli:instant>2023-12-31</xbrli:instant></xbrli:period>
//!   </xbrli:context>
//!   <xbrli:unit id="usd"><xbrli:measure>iso4217:USD</xbrli:measure></xbrli:unit>
//!   <us-gaap:Assets contextRef="FY23" unitRef="usd" decimals="-6">1000000</us-gaap:Assets>
//! </xbrli:xbrl>"#;
//!
//! let doc = parse_instance(xml).unwrap();
//! assert_eq!(doc.facts.len(), 1);
//! assert_eq!(doc.facts[0].concept, "us-gaap_Assets");
//! assert_eq!(doc.facts[0].value, Some(1_000_000.0));
//! ```

/// Instance document parsing.
pub mod instance;
/// Label linkbase parsing.
pub mod labels;
/// Calculation and presentation linkbase parsing.
pub mod linkbase;

mod xml;

pub use instance::{Context, InstanceDocument, parse_instance};
pub use labels::{LabelSet, parse_labels, roles};
pub use linkbase::{Relationship, parse_linkbase};
