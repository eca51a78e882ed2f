//! Small helpers over quick-xml events.

use quick_xml::events::BytesStart;

/// Local part of an element name (`context` for `xbrli:context`).
pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Full qualified name of an element (`us-gaap:Assets`).
pub(crate) fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Attribute value matched by full key or by local part (`label` matches `xlink:label`).
pub(crate) fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| {
            a.key.as_ref() == name.as_bytes() || a.key.local_name().as_ref() == name.as_bytes()
        })
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Element id referenced by an `xlink:href` (`schema.xsd#us-gaap_Assets` → `us-gaap_Assets`).
pub(crate) fn href_fragment(href: &str) -> Option<&str> {
    href.rsplit_once('#')
        .map(|(_, fragment)| fragment)
        .filter(|f| !f.is_empty())
}
