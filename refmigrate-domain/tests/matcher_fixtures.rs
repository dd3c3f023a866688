//! Planner behavior against a realistic multi-package project fixture.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use refmigrate_domain::plan_edits;
use refmigrate_types::PackageEntry;
use refmigrate_xml::Document;

const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="14.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <Import Project="..\packages\xunit.runner.visualstudio.2.4.1\build\net20\xunit.runner.visualstudio.props" Condition="Exists('..\packages\xunit.runner.visualstudio.2.4.1\build\net20\xunit.runner.visualstudio.props')" />
  <PropertyGroup>
    <OutputType>Library</OutputType>
    <RootNamespace>Acme.Tests</RootNamespace>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="Newtonsoft.Json, Version=12.0.0.0, Culture=neutral, PublicKeyToken=30ad4fe6b2a6aeed">
      <HintPath>..\packages\Newtonsoft.Json.12.0.1\lib\net45\Newtonsoft.Json.dll</HintPath>
    </Reference>
    <Reference Include="xunit.core">
      <HintPath>..\packages\xunit.extensibility.core.2.4.1\lib\net452\xunit.core.dll</HintPath>
    </Reference>
    <Reference Include="System.Xml" />
    <Reference Include="System.Xml.Linq" />
  </ItemGroup>
  <ItemGroup>
    <None Include="packages.config" />
    <None Include="App.config" />
  </ItemGroup>
  <Target Name="EnsureNuGetPackageBuildImports" BeforeTargets="PrepareForBuild">
    <PropertyGroup>
      <ErrorText>This project references NuGet package(s) that are missing on this computer.</ErrorText>
    </PropertyGroup>
    <Error Condition="!Exists('..\packages\xunit.runner.visualstudio.2.4.1\build\net20\xunit.runner.visualstudio.props')" Text="$([System.String]::Format('$(ErrorText)', '..\packages\xunit.runner.visualstudio.2.4.1\build\net20\xunit.runner.visualstudio.props'))" />
  </Target>
</Project>"#;

fn entries() -> Vec<PackageEntry> {
    vec![
        PackageEntry::new("Newtonsoft.Json", "12.0.1"),
        PackageEntry::new("xunit.extensibility.core", "2.4.1"),
        PackageEntry::new("xunit.runner.visualstudio", "2.4.1"),
    ]
}

#[test]
fn plan_covers_every_legacy_artifact_of_the_fixture() {
    let doc = Document::parse(PROJECT).expect("parse");
    let plan = plan_edits(&doc, &entries());

    // Every manifest entry projects to a new reference, in manifest order.
    let ids: Vec<&str> = plan.new_references.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        ["Newtonsoft.Json", "xunit.extensibility.core", "xunit.runner.visualstudio"]
    );

    // Newtonsoft.Json by Include prefix, xunit.core by HintPath subtree text.
    assert_eq!(plan.obsolete_references.len(), 2);
    for &node in &plan.obsolete_references {
        let include = doc.attribute(node, "Include").expect("Include");
        assert!(include.starts_with("Newtonsoft.Json") || include == "xunit.core");
    }

    assert_eq!(plan.obsolete_imports.len(), 1);
    assert_eq!(plan.obsolete_errors.len(), 1);
    assert!(plan.legacy_marker.is_some());

    // The guard Target holds no Error the plan leaves behind, so it goes too.
    assert!(plan.guard_target.is_some());
}

#[test]
fn framework_references_and_other_none_items_survive() {
    let doc = Document::parse(PROJECT).expect("parse");
    let plan = plan_edits(&doc, &entries());

    for &node in &plan.obsolete_references {
        let include = doc.attribute(node, "Include").expect("Include");
        assert!(!include.starts_with("System.Xml"));
    }
    let marker = plan.legacy_marker.expect("marker");
    assert_eq!(doc.attribute(marker, "Include"), Some("packages.config"));
}

#[test]
fn guard_survives_when_it_still_hosts_a_live_error() {
    // Only migrate Newtonsoft.Json; the xunit Error inside the guard stays live.
    let doc = Document::parse(PROJECT).expect("parse");
    let plan = plan_edits(&doc, &[PackageEntry::new("Newtonsoft.Json", "12.0.1")]);

    assert!(plan.obsolete_errors.is_empty());
    assert!(plan.guard_target.is_none());
    assert_eq!(plan.obsolete_references.len(), 1);
}

proptest! {
    /// Planning never mutates the document and is stable across repeated runs.
    #[test]
    fn planning_is_pure_and_deterministic(
        ids in proptest::collection::vec("[A-Za-z][A-Za-z0-9.]{0,24}", 0..6)
    ) {
        let doc = Document::parse(PROJECT).expect("parse");
        let before = doc.to_xml_string().expect("serialize");
        let entries: Vec<PackageEntry> = ids
            .iter()
            .map(|id| PackageEntry::new(id, "1.0.0"))
            .collect();

        let first = plan_edits(&doc, &entries);
        let second = plan_edits(&doc, &entries);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(doc.to_xml_string().expect("serialize"), before);
    }
}
