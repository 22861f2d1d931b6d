use std::path::PathBuf;
use std::sync::RwLock;

/// An isolated sub-application carrying one definition's template namespace.
///
/// Each definition gets its own view-engine binding rooted at its `public/`
/// folder so its templates never collide with another definition's. Rendering
/// itself belongs to the host web framework; this type only records the
/// binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubApp {
    pub name: String,
    pub view_engine: String,
    pub views_root: PathBuf,
}

/// A static-file root mounted under a URL namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMount {
    pub url_prefix: String,
    pub dir: PathBuf,
}

/// The host web application surface the wirer mounts definitions onto.
///
/// Mounting is additive and namespaced by definition name, so concurrent
/// wiring of different definitions needs no coordination beyond this
/// interface.
pub trait HostApp: Send + Sync {
    fn mount_static(&self, url_prefix: &str, dir: PathBuf);

    fn mount_subapp(&self, subapp: SubApp);
}

/// Record-only [`HostApp`]: collects every mount so a concrete web app can be
/// built from the plan after discovery completes.
#[derive(Default)]
pub struct MountPlan {
    statics: RwLock<Vec<StaticMount>>,
    subapps: RwLock<Vec<SubApp>>,
}

impl MountPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn static_mounts(&self) -> Vec<StaticMount> {
        self.statics.read().expect("mount plan poisoned").clone()
    }

    pub fn subapps(&self) -> Vec<SubApp> {
        self.subapps.read().expect("mount plan poisoned").clone()
    }
}

impl HostApp for MountPlan {
    fn mount_static(&self, url_prefix: &str, dir: PathBuf) {
        tracing::debug!("mounting static root {} at {}", dir.display(), url_prefix);
        self.statics
            .write()
            .expect("mount plan poisoned")
            .push(StaticMount {
                url_prefix: url_prefix.to_string(),
                dir,
            });
    }

    fn mount_subapp(&self, subapp: SubApp) {
        tracing::debug!("mounting sub-application for '{}'", subapp.name);
        self.subapps
            .write()
            .expect("mount plan poisoned")
            .push(subapp);
    }
}
