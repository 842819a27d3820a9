//! Typed accessors over a decoded `AndroidManifest.xml`.

use crate::xml::XmlElement;
use serde::Serialize;

const ACTION_MAIN: &str = "android.intent.action.MAIN";
const CATEGORY_LAUNCHER: &str = "android.intent.category.LAUNCHER";

/// Package identity and SDK bounds declared by the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    /// Application id (`package`)
    pub package: Option<String>,
    /// `android:versionName`
    pub version_name: Option<String>,
    /// `android:versionCode`
    pub version_code: Option<String>,
    /// `uses-sdk/android:minSdkVersion`
    pub min_sdk: Option<String>,
    /// `uses-sdk/android:targetSdkVersion`
    pub target_sdk: Option<String>,
}

/// The manifest element tree plus lookups the report needs.
#[derive(Debug, Clone)]
pub struct Manifest {
    root: XmlElement,
}

impl Manifest {
    /// Wrap a decoded root element
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// The `<manifest>` element
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    fn text(element: &XmlElement, name: &str) -> Option<String> {
        element.attribute(name).map(str::to_string)
    }

    /// Application id
    pub fn package(&self) -> Option<String> {
        Self::text(&self.root, "package")
    }

    fn uses_sdk(&self, name: &str) -> Option<String> {
        Self::text(self.root.child("uses-sdk")?, name)
    }

    /// Identity and SDK bounds in one value
    pub fn package_info(&self) -> PackageInfo {
        PackageInfo {
            package: self.package(),
            version_name: Self::text(&self.root, "versionName"),
            version_code: Self::text(&self.root, "versionCode"),
            min_sdk: self.uses_sdk("minSdkVersion"),
            target_sdk: self.uses_sdk("targetSdkVersion"),
        }
    }

    fn components<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.root
            .children_named("application")
            .flat_map(move |app| app.children_named(tag))
    }

    /// Expand a component name relative to the package.
    ///
    /// `.Foo` becomes `package.Foo`; a bare `Foo` becomes `package.Foo`;
    /// anything else is already fully qualified.
    pub fn resolve_name(&self, name: &str) -> String {
        match self.package() {
            Some(package) if name.starts_with('.') => format!("{package}{name}"),
            Some(package) if !name.contains('.') => format!("{package}.{name}"),
            _ => name.to_string(),
        }
    }

    fn component_name(&self, element: &XmlElement) -> Option<String> {
        element
            .attribute("name")
            .filter(|n| !n.is_empty())
            .map(|n| self.resolve_name(n))
    }

    /// Declared activities, resolved, in document order
    pub fn activities(&self) -> Vec<String> {
        self.components("activity")
            .filter_map(|a| self.component_name(a))
            .collect()
    }

    /// Enabled activities and aliases with a MAIN + LAUNCHER intent filter,
    /// resolved and sorted
    pub fn main_activities(&self) -> Vec<String> {
        let mut found: Vec<String> = self
            .root
            .children_named("application")
            .flat_map(|app| app.children.iter())
            .filter(|c| c.tag == "activity" || c.tag == "activity-alias")
            .filter(|c| c.attribute("enabled") != Some("false"))
            .filter(|c| c.children_named("intent-filter").any(is_launcher_filter))
            .filter_map(|c| self.component_name(c))
            .collect();
        found.sort();
        found.dedup();
        found
    }

    /// The launcher activity.
    ///
    /// With several candidates, the smallest name that is also a declared
    /// `<activity>` wins; otherwise the smallest candidate overall.
    pub fn main_activity(&self) -> Option<String> {
        let candidates = self.main_activities();
        let declared = self.activities();
        candidates
            .iter()
            .find(|c| declared.contains(c))
            .or_else(|| candidates.first())
            .cloned()
    }
}

fn is_launcher_filter(filter: &XmlElement) -> bool {
    let has = |tag: &str, wanted: &str| {
        filter
            .children_named(tag)
            .any(|e| e.attribute("name") == Some(wanted))
    };
    has("action", ACTION_MAIN) && has("category", CATEGORY_LAUNCHER)
}
