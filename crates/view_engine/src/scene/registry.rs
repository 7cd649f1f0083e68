//! Authoritative id-keyed object registry
//!
//! The registry is the single owner of synchronized scene state. Every
//! mutation keeps three things in lockstep: the record map, the backend's
//! renderable resources, and the active render set. Operations that change
//! nothing emit nothing; operations that change anything emit exactly one
//! [`ViewerEvent::RegistryChanged`].

use std::collections::HashMap;

use crate::events::{Notifier, ViewerEvent};
use crate::render::backend::SharedBackend;
use crate::scene::object::{ObjectRecord, SceneError, SceneObject};

/// Registry of synchronized scene objects plus the two built-ins
pub struct ObjectRegistry {
    objects: HashMap<String, SceneObject>,
    ground_plane_id: String,
    default_cube_id: String,
    backend: SharedBackend,
    notifier: Notifier,
}

impl ObjectRegistry {
    /// Create a registry seeded with the ground plane and default cube.
    ///
    /// The ground plane is attached only when `show_ground_plane` is set; the
    /// default cube is always shown until data replaces or removes it.
    pub fn new(
        backend: SharedBackend,
        notifier: Notifier,
        show_ground_plane: bool,
    ) -> Result<Self, SceneError> {
        let mut registry = Self {
            objects: HashMap::new(),
            ground_plane_id: uuid::Uuid::new_v4().to_string(),
            default_cube_id: uuid::Uuid::new_v4().to_string(),
            backend,
            notifier,
        };

        let ground_plane = ObjectRecord::new(
            registry.ground_plane_id.clone(),
            "GroundPlane",
            "Ground plane",
        );
        registry.insert_record(&ground_plane)?;
        if !show_ground_plane {
            let ground_id = registry.ground_plane_id.clone();
            registry.set_visible_internal(&ground_id, false);
        }

        let default_cube = ObjectRecord::new(
            registry.default_cube_id.clone(),
            "DefaultCube",
            "Default cube",
        );
        registry.insert_record(&default_cube)?;

        Ok(registry)
    }

    /// Id of the built-in ground plane
    pub fn ground_plane_id(&self) -> &str {
        &self.ground_plane_id
    }

    /// Id of the built-in default cube
    pub fn default_cube_id(&self) -> &str {
        &self.default_cube_id
    }

    /// Number of objects, built-ins included
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the registry holds no objects at all
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether an object with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    /// Look up an object by id
    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Ids of all held objects, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Insert a record, replacing any existing object with the same id.
    ///
    /// The new renderable is built before the old one is released, so a
    /// rejected record leaves the previous object fully intact.
    pub fn add(&mut self, record: &ObjectRecord) -> Result<(), SceneError> {
        self.insert_record(record)?;
        self.notifier.emit(&ViewerEvent::RegistryChanged);
        Ok(())
    }

    /// Remove an object and release its renderable; absent ids are a no-op
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(object) = self.objects.remove(id) else {
            log::debug!("remove: no object with id {id}");
            return false;
        };
        self.backend.lock().unwrap().release(object.handle);
        log::info!("removed {} object '{}' ({id})", object.kind, object.name);
        self.notifier.emit(&ViewerEvent::RegistryChanged);
        true
    }

    /// Replace all synchronized objects with the given records.
    ///
    /// The ground plane survives with its visibility untouched; everything
    /// else, the default cube included, is released first. Records that fail
    /// validation or building are skipped with a [`ViewerEvent::Fault`] and
    /// do not abort the rest. One `RegistryChanged` is emitted at the end.
    pub fn reset(&mut self, records: &[ObjectRecord]) {
        let stale: Vec<String> = self
            .objects
            .keys()
            .filter(|id| **id != self.ground_plane_id)
            .cloned()
            .collect();
        for id in stale {
            if let Some(object) = self.objects.remove(&id) {
                self.backend.lock().unwrap().release(object.handle);
            }
        }

        for record in records {
            if let Err(e) = self.insert_record(record) {
                log::error!("sync: rejected record '{}': {e}", record.id);
                self.notifier
                    .emit(&ViewerEvent::Fault(format!("rejected record '{}': {e}", record.id)));
            }
        }

        log::info!("scene reset: {} objects", self.objects.len());
        self.notifier.emit(&ViewerEvent::RegistryChanged);
    }

    /// Set one object's visibility; absent ids and no-op changes emit nothing
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        if self.set_visible_internal(id, visible) {
            self.notifier.emit(&ViewerEvent::RegistryChanged);
            true
        } else {
            false
        }
    }

    /// Show `id` and hide every other object except the ground plane.
    ///
    /// An absent id is a complete no-op; nothing is hidden either.
    pub fn show_only(&mut self, id: &str) {
        if !self.objects.contains_key(id) {
            log::debug!("show_only: no object with id {id}");
            return;
        }
        let ids: Vec<String> = self
            .objects
            .keys()
            .filter(|existing| **existing != self.ground_plane_id)
            .cloned()
            .collect();
        let mut changed = false;
        for existing in ids {
            changed |= self.set_visible_internal(&existing, existing == id);
        }
        if changed {
            self.notifier.emit(&ViewerEvent::RegistryChanged);
        }
    }

    /// Show every object except the ground plane, which keeps its state
    pub fn show_all(&mut self) {
        self.set_all_visible(true);
    }

    /// Hide every object except the ground plane, which keeps its state
    pub fn hide_all(&mut self) {
        self.set_all_visible(false);
    }

    fn set_all_visible(&mut self, visible: bool) {
        let ids: Vec<String> = self
            .objects
            .keys()
            .filter(|id| **id != self.ground_plane_id)
            .cloned()
            .collect();
        let mut changed = false;
        for id in ids {
            changed |= self.set_visible_internal(&id, visible);
        }
        if changed {
            self.notifier.emit(&ViewerEvent::RegistryChanged);
        }
    }

    fn set_visible_internal(&mut self, id: &str, visible: bool) -> bool {
        let Some(object) = self.objects.get_mut(id) else {
            log::debug!("set_visible: no object with id {id}");
            return false;
        };
        if object.visible == visible {
            return false;
        }
        object.visible = visible;
        let mut backend = self.backend.lock().unwrap();
        if visible {
            backend.attach(object.handle);
        } else {
            backend.detach(object.handle);
        }
        true
    }

    /// Validate, build, and store a record without emitting notifications
    fn insert_record(&mut self, record: &ObjectRecord) -> Result<(), SceneError> {
        let kind = record.parse_kind()?;
        let payload = record.parse_payload(kind)?;

        let handle = {
            let mut backend = self.backend.lock().unwrap();
            let handle = backend.build_renderable(kind, &payload)?;
            backend.attach(handle);
            handle
        };

        if let Some(previous) = self.objects.remove(&record.id) {
            log::debug!("replacing object {} ({})", record.id, previous.kind);
            self.backend.lock().unwrap().release(previous.handle);
        }

        self.objects.insert(
            record.id.clone(),
            SceneObject {
                id: record.id.clone(),
                kind,
                name: record.name.clone(),
                payload,
                visible: true,
                handle,
            },
        );
        log::debug!("stored {} object '{}' ({})", kind, record.name, record.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use crate::render::backend::testing::{BackendCall, RecordingBackend};
    use crate::scene::object::ObjectKind;

    fn recording_registry(
        show_ground_plane: bool,
    ) -> (ObjectRegistry, Arc<Mutex<RecordingBackend>>, Arc<Mutex<Vec<ViewerEvent>>>) {
        let backend = Arc::new(Mutex::new(RecordingBackend::new()));
        let notifier = Notifier::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        {
            let events = Arc::clone(&events);
            notifier.subscribe(move |event| events.lock().unwrap().push(event.clone()));
        }
        let registry = ObjectRegistry::new(backend.clone(), notifier, show_ground_plane)
            .expect("builtin construction");
        (registry, backend, events)
    }

    fn cloud_record(id: &str) -> ObjectRecord {
        ObjectRecord {
            id: id.to_string(),
            kind: "PointCloud".to_string(),
            name: "cloud".to_string(),
            payload: Some(json!({ "points": [[0.0, 0.0, 0.0]] })),
        }
    }

    #[test]
    fn seeds_ground_plane_and_default_cube() {
        let (registry, backend, _) = recording_registry(true);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(registry.ground_plane_id()));
        assert!(registry.contains(registry.default_cube_id()));
        assert_eq!(backend.lock().unwrap().inner().attached_count(), 2);
    }

    #[test]
    fn hidden_ground_plane_is_built_but_detached() {
        let (registry, backend, _) = recording_registry(false);
        let ground = registry.get(registry.ground_plane_id()).unwrap();
        assert!(!ground.visible);
        assert_eq!(backend.lock().unwrap().inner().built_count(), 2);
        assert_eq!(backend.lock().unwrap().inner().attached_count(), 1);
    }

    #[test]
    fn add_with_colliding_id_builds_new_before_releasing_old() {
        let (mut registry, backend, _) = recording_registry(true);
        registry.add(&cloud_record("pc")).unwrap();
        let first = registry.get("pc").unwrap().handle;

        registry.add(&cloud_record("pc")).unwrap();
        let second = registry.get("pc").unwrap().handle;
        assert_ne!(first, second);
        assert_eq!(registry.len(), 3);

        let calls = &backend.lock().unwrap().calls;
        let build_pos = calls
            .iter()
            .position(|c| matches!(c, BackendCall::Build(ObjectKind::PointCloud, h) if *h == second))
            .unwrap();
        let release_pos = calls
            .iter()
            .position(|c| *c == BackendCall::Release(first))
            .unwrap();
        assert!(build_pos < release_pos);
    }

    #[test]
    fn rejected_add_leaves_registry_untouched() {
        let (mut registry, backend, events) = recording_registry(true);
        registry.add(&cloud_record("pc")).unwrap();
        events.lock().unwrap().clear();
        let before = registry.get("pc").unwrap().handle;

        let bad = ObjectRecord {
            payload: Some(json!({ "size": 0.5 })),
            ..cloud_record("pc")
        };
        assert!(matches!(registry.add(&bad), Err(SceneError::MalformedPayload(_))));
        assert_eq!(registry.get("pc").unwrap().handle, before);
        assert!(events.lock().unwrap().is_empty());

        // And the failure does not poison later operations.
        registry.add(&cloud_record("pc2")).unwrap();
        assert!(registry.contains("pc2"));
        drop(backend);
    }

    #[test]
    fn failed_build_leaves_registry_untouched() {
        let (mut registry, backend, _) = recording_registry(true);
        registry.add(&cloud_record("pc")).unwrap();
        let before = registry.get("pc").unwrap().handle;

        backend.lock().unwrap().fail_builds = true;
        assert!(matches!(
            registry.add(&cloud_record("pc")),
            Err(SceneError::Render(_))
        ));
        assert_eq!(registry.get("pc").unwrap().handle, before);
        assert!(backend.lock().unwrap().inner().is_built(before));
    }

    #[test]
    fn remove_releases_and_is_idempotent() {
        let (mut registry, backend, events) = recording_registry(true);
        registry.add(&cloud_record("pc")).unwrap();
        let handle = registry.get("pc").unwrap().handle;
        events.lock().unwrap().clear();

        assert!(registry.remove("pc"));
        assert!(!backend.lock().unwrap().inner().is_built(handle));
        assert_eq!(events.lock().unwrap().len(), 1);

        // Second remove is a silent no-op.
        assert!(!registry.remove("pc"));
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn reset_replaces_everything_but_the_ground_plane() {
        let (mut registry, backend, events) = recording_registry(false);
        registry.add(&cloud_record("old")).unwrap();
        events.lock().unwrap().clear();

        registry.reset(&[cloud_record("a"), cloud_record("b")]);

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("a"));
        assert!(registry.contains("b"));
        assert!(!registry.contains("old"));
        let cube_id = registry.default_cube_id().to_string();
        assert!(!registry.contains(&cube_id));

        // Ground plane visibility survives the reset untouched.
        let ground = registry.get(registry.ground_plane_id()).unwrap();
        assert!(!ground.visible);

        // One coalesced change notification for the whole sync.
        assert_eq!(
            events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| **e == ViewerEvent::RegistryChanged)
                .count(),
            1
        );
        drop(backend);
    }

    #[test]
    fn reset_reports_bad_records_and_keeps_good_ones() {
        let (mut registry, _, events) = recording_registry(true);
        events.lock().unwrap().clear();

        let bad = ObjectRecord::new("bad", "Sphere", "nope");
        registry.reset(&[cloud_record("good"), bad]);

        assert!(registry.contains("good"));
        assert!(!registry.contains("bad"));
        let events = events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(e, ViewerEvent::Fault(_))));
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == ViewerEvent::RegistryChanged)
                .count(),
            1
        );
    }

    #[test]
    fn visibility_changes_drive_the_active_set() {
        let (mut registry, backend, events) = recording_registry(true);
        registry.add(&cloud_record("pc")).unwrap();
        let handle = registry.get("pc").unwrap().handle;
        events.lock().unwrap().clear();

        assert!(registry.set_visible("pc", false));
        assert!(!backend.lock().unwrap().inner().is_attached(handle));

        // Setting the same state again is a no-op without notification.
        assert!(!registry.set_visible("pc", false));
        assert_eq!(events.lock().unwrap().len(), 1);

        assert!(registry.set_visible("pc", true));
        assert!(backend.lock().unwrap().inner().is_attached(handle));
    }

    #[test]
    fn show_only_with_absent_id_hides_nothing() {
        let (mut registry, _, events) = recording_registry(true);
        registry.add(&cloud_record("a")).unwrap();
        events.lock().unwrap().clear();

        registry.show_only("ghost");

        assert!(registry.get("a").unwrap().visible);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn set_visible_on_absent_id_is_silent() {
        let (mut registry, _, events) = recording_registry(true);
        events.lock().unwrap().clear();
        assert!(!registry.set_visible("ghost", true));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn show_only_spares_the_ground_plane() {
        let (mut registry, _, events) = recording_registry(true);
        registry.add(&cloud_record("a")).unwrap();
        registry.add(&cloud_record("b")).unwrap();
        events.lock().unwrap().clear();

        registry.show_only("a");

        assert!(registry.get("a").unwrap().visible);
        assert!(!registry.get("b").unwrap().visible);
        assert!(!registry.get(registry.default_cube_id()).unwrap().visible);
        assert!(registry.get(registry.ground_plane_id()).unwrap().visible);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn hide_then_show_only_restores_visibility() {
        let (mut registry, _, _) = recording_registry(true);
        registry.reset(&[ObjectRecord::new("a", "DefaultCube", "A")]);

        registry.set_visible("a", false);
        registry.show_only("a");

        assert!(registry.get("a").unwrap().visible);
        assert!(registry.get(registry.ground_plane_id()).unwrap().visible);
    }

    #[test]
    fn hide_all_and_show_all_spare_the_ground_plane() {
        let (mut registry, _, _) = recording_registry(false);
        registry.add(&cloud_record("a")).unwrap();

        registry.hide_all();
        assert!(!registry.get("a").unwrap().visible);
        // Hidden ground plane stays hidden through show_all.
        registry.show_all();
        assert!(registry.get("a").unwrap().visible);
        assert!(!registry.get(registry.ground_plane_id()).unwrap().visible);
    }
}
