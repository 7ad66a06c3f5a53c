//! Registration of the Vue extension with the asset builder.

use crate::app::AppDefinition;
use crate::error::{BuildError, BuildResult};

/// Environment the asset builder was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEnvironment {
    /// Standalone builder CLI.
    Standalone,
    /// Embedded in the express-style SSR server.
    Express,
}

/// The process that owns the app builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentContext {
    pub environment: HostEnvironment,
    pub is_prod: bool,
}

/// The Vue extension, registered for a single app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VueExtension {
    scope: String,
}

impl VueExtension {
    /// Register the extension. Only the `app` scope is supported.
    pub fn register(scope: &str) -> BuildResult<Self> {
        if scope != "app" {
            return Err(BuildError::Configuration(
                "The vue extension cannot be defined on a global scope!".into(),
            ));
        }
        Ok(Self {
            scope: scope.to_string(),
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Prepare `app` once the worker is initialized.
    ///
    /// Returns whether a server build has to be spawned for it. Active SSR
    /// turns the HTML template on unless the app chose otherwise.
    pub fn prepare(&self, app: &mut AppDefinition, parent: &ParentContext, process_flag: bool) -> bool {
        if !app.is_ssr_active(process_flag) {
            return false;
        }
        if app.html_template.is_none() {
            app.html_template = Some(true);
        }

        if app.is_worker() {
            return false;
        }
        // A production express server reads persisted bundles instead.
        !(parent.environment == HostEnvironment::Express && parent.is_prod)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::derive_server_app;

    fn parent(environment: HostEnvironment, is_prod: bool) -> ParentContext {
        ParentContext {
            environment,
            is_prod,
        }
    }

    #[test]
    fn test_scope_check() {
        assert_eq!(VueExtension::register("app").unwrap().scope(), "app");
        assert!(matches!(
            VueExtension::register("global"),
            Err(BuildError::Configuration(_))
        ));
    }

    #[test]
    fn test_spawn_gating() {
        let ext = VueExtension::register("app").unwrap();
        let dev = parent(HostEnvironment::Express, false);

        let mut plain = AppDefinition::new(0, "Frontend");
        assert!(!ext.prepare(&mut plain, &dev, false));
        assert_eq!(plain.html_template, None);

        let mut ssr = AppDefinition::new(0, "Frontend").with_ssr(true);
        assert!(ext.prepare(&mut ssr, &dev, false));
        assert_eq!(ssr.html_template, Some(true));

        let mut flagged = AppDefinition::new(0, "Frontend");
        assert!(ext.prepare(&mut flagged, &dev, true));
    }

    #[test]
    fn test_no_spawn_for_workers_or_express_production() {
        let ext = VueExtension::register("app").unwrap();
        let app = AppDefinition::new(0, "Frontend").with_ssr(true);

        let mut worker = derive_server_app(&app);
        assert!(!ext.prepare(&mut worker, &parent(HostEnvironment::Standalone, false), false));

        let mut prod = app.clone();
        assert!(!ext.prepare(&mut prod, &parent(HostEnvironment::Express, true), false));

        let mut standalone_prod = app.clone();
        assert!(ext.prepare(&mut standalone_prod, &parent(HostEnvironment::Standalone, true), false));
    }

    #[test]
    fn test_explicit_template_choice_kept() {
        let ext = VueExtension::register("app").unwrap();
        let mut app = AppDefinition::new(0, "Frontend").with_ssr(true);
        app.html_template = Some(false);

        ext.prepare(&mut app, &parent(HostEnvironment::Express, false), false);

        assert_eq!(app.html_template, Some(false));
    }
}
