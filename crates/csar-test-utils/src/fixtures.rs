//! Canned TOSCA documents used by the sample archive.

/// Manifest of the sample archive.
pub const TOSCA_META: &str = "\
TOSCA-Meta-File-Version: 1.0
CSAR-Version: 1.0
Created-By: Winery 2.0.0
Entry-Definitions: Definitions/app.tosca

Name: Definitions/app.tosca
Content-Type: application/vnd.oasis.tosca.definitions

Name: Scripts/install.sh
Content-Type: application/x-sh
";

/// Service template using the TOSCA namespace as default namespace.
pub const SERVICE_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Definitions xmlns="http://docs.oasis-open.org/tosca/ns/2011/12" id="app" name="app" targetNamespace="http://example.org/tosca/app">
    <ServiceTemplate id="app_service" name="app_service">
        <TopologyTemplate>
            <NodeTemplate id="install.sh" name="install.sh" type="ns:Script" xmlns:ns="http://example.org/tosca/types"/>
            <NodeTemplate id="nginx" name="nginx" type="ns:Package" xmlns:ns="http://example.org/tosca/types"/>
        </TopologyTemplate>
    </ServiceTemplate>
</Definitions>
"#;

/// Service template with prefixed TOSCA elements, no topology yet and an
/// existing import.
pub const PREFIXED_SERVICE_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tosca:Definitions xmlns:tosca="http://docs.oasis-open.org/tosca/ns/2011/12" id="app" targetNamespace="http://example.org/tosca/app">
    <tosca:Import importType="http://docs.oasis-open.org/tosca/ns/2011/12" location="types.tosca" namespace="http://example.org/tosca/types"/>
    <tosca:ServiceTemplate id="app_service">
    </tosca:ServiceTemplate>
</tosca:Definitions>
"#;

/// Install script referenced by the sample topology.
pub const INSTALL_SCRIPT: &str = "#!/bin/sh\napt-get install -y nginx\n";
