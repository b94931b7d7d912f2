//! The definitions document declaring the `RR_DependsOn` relationship type.

use std::path::Path;

use csar_fs::{CsarPath, NormalizedPath, io};
use csar_meta::{DEFINITIONS_MEDIA_TYPE, Manifest};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::{DEPENDS_ON, Error, RR_NAMESPACE, Result, TOSCA_NAMESPACE};

/// File name of the descriptor inside the definitions folder.
pub const DESCRIPTOR_FILE: &str = "RR_DependsOn.tosca";

const WINERY_NAMESPACE: &str = "http://www.opentosca.org/winery/extensions/tosca/2013/02/12";
const SELFSERVICE_NAMESPACE: &str = "http://www.eclipse.org/winery/model/selfservice";
const DEFINITIONS_ID: &str = "winery-defs-RR_DependsOn_Realation";

/// Archive-relative path of the descriptor.
pub fn descriptor_path() -> NormalizedPath {
    NormalizedPath::new(CsarPath::DefinitionsDir.as_str()).join(DESCRIPTOR_FILE)
}

/// The descriptor document. Identical on every call.
pub fn render() -> Result<String> {
    let path = descriptor_path().to_native();
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    let mut root = BytesStart::new("tosca:Definitions");
    root.push_attribute(("xmlns:tosca", TOSCA_NAMESPACE));
    root.push_attribute(("xmlns:winery", WINERY_NAMESPACE));
    root.push_attribute(("xmlns:ns1", SELFSERVICE_NAMESPACE));
    root.push_attribute(("id", DEFINITIONS_ID));
    root.push_attribute(("targetNamespace", RR_NAMESPACE));

    let mut relationship = BytesStart::new("tosca:RelationshipType");
    relationship.push_attribute(("name", DEPENDS_ON));
    relationship.push_attribute(("targetNamespace", RR_NAMESPACE));

    for event in [
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
        Event::Start(root),
        Event::Empty(relationship),
        Event::End(BytesEnd::new("tosca:Definitions")),
    ] {
        writer
            .write_event(event)
            .map_err(|e| Error::write(&path, e))?;
    }

    let mut text = String::from_utf8(writer.into_inner()).map_err(|e| Error::write(&path, e))?;
    text.push('\n');
    Ok(text)
}

/// Write the descriptor into the workspace and register it.
///
/// Safe to call repeatedly: an existing file is overwritten with the same
/// bytes and the manifest entry is only added once.
pub fn ensure(workspace: &Path, manifest: &mut Manifest) -> Result<NormalizedPath> {
    let relative = descriptor_path();
    io::write_text(&relative.under(workspace), &render()?)?;
    if manifest.add_entry(relative.clone(), DEFINITIONS_MEDIA_TYPE) {
        tracing::info!(path = %relative, "Registered relationship descriptor");
    }
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;

    #[test]
    fn render_is_stable() {
        assert_eq!(render().unwrap(), render().unwrap());
    }

    #[test]
    fn declares_depends_on_type() {
        let text = render().unwrap();
        let mut reader = Reader::from_str(&text);
        let mut names = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(tag) | Event::Empty(tag) => {
                    names.push(String::from_utf8_lossy(tag.local_name().as_ref()).into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        assert_eq!(names, ["Definitions", "RelationshipType"]);
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(text.contains("id=\"winery-defs-RR_DependsOn_Realation\""));
        assert!(text.contains("name=\"RR_DependsOn\""));
    }

    #[test]
    fn relationship_type_is_in_tosca_namespace() {
        let text = render().unwrap();
        let mut reader = quick_xml::NsReader::from_str(&text);
        let mut found = false;
        loop {
            match reader.read_resolved_event().unwrap() {
                (quick_xml::name::ResolveResult::Bound(ns), Event::Empty(tag))
                    if tag.local_name().as_ref() == b"RelationshipType" =>
                {
                    assert_eq!(ns.as_ref(), TOSCA_NAMESPACE.as_bytes());
                    found = true;
                }
                (_, Event::Eof) => break,
                _ => {}
            }
        }
        assert!(found);
    }
}
