use std::collections::HashMap;

use glam::Vec2;
use tracing::debug;

use crate::api::{ContactListener, NarrowphaseApi};
use crate::body::Body;
use crate::narrowphase::Narrowphase;
use crate::types::*;
use crate::vector::Vec2Ext;

/// Tracks contacts between collider pairs across steps and corrects the
/// bodies involved.
#[derive(Default)]
pub struct ContactManager {
    contacts: Vec<Contact>,
    // Unordered collider pair -> position in `contacts`
    index: HashMap<(ColliderHandle, ColliderHandle), usize>,
    events: Vec<ContactEvent>,
    listener: Option<Box<dyn ContactListener>>,
}

impl std::fmt::Debug for ContactManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactManager")
            .field("contacts", &self.contacts)
            .field("events", &self.events)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl ContactManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.listener = Some(listener);
    }

    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Tracked contact for an unordered collider pair.
    pub fn find(&self, a: ColliderHandle, b: ColliderHandle) -> Option<&Contact> {
        self.index.get(&pair_key(a, b)).map(|&i| &self.contacts[i])
    }

    /// Test every collider of `a` against every collider of `b`, updating the
    /// contact set and resolving non-sensor overlaps. Pairs where neither body
    /// is dynamic are skipped.
    pub fn test_pair(&mut self, a: &mut Body, b: &mut Body) {
        if !a.body_type().is_dynamic() && !b.body_type().is_dynamic() {
            return;
        }

        for i in 0..a.colliders().len() {
            for j in 0..b.colliders().len() {
                let ca = ColliderHandle { body: a.handle(), index: i as u16 };
                let cb = ColliderHandle { body: b.handle(), index: j as u16 };

                let (overlap, sensor, mat_a, mat_b) = {
                    let (col_a, col_b) = (&a.colliders()[i], &b.colliders()[j]);
                    let overlap = if col_a.aabb().overlaps(col_b.aabb()) {
                        Narrowphase::colliders(col_a, col_b)
                    } else {
                        None
                    };
                    (
                        overlap,
                        col_a.is_sensor() || col_b.is_sensor(),
                        col_a.material(),
                        col_b.material(),
                    )
                };

                let existing = self.index.get(&pair_key(ca, cb)).copied();
                match (existing, overlap) {
                    (None, Some(overlap)) => {
                        let contact = Contact::new(ca, cb, overlap);
                        self.index.insert(pair_key(ca, cb), self.contacts.len());
                        self.contacts.push(contact);
                        self.notify(ContactEventKind::Added, contact);
                        if !sensor {
                            resolve(a, b, overlap, &mat_a, &mat_b);
                        }
                    }
                    (Some(idx), Some(overlap)) => {
                        let record = &mut self.contacts[idx];
                        let oriented = if record.collider_a == ca { overlap } else { overlap.flipped() };
                        record.normal = oriented.normal;
                        record.mtv = oriented.mtv;
                        record.touched = true;
                        if !sensor {
                            resolve(a, b, overlap, &mat_a, &mat_b);
                        }
                    }
                    (Some(idx), None) => {
                        let contact = self.remove_at(idx);
                        self.notify(ContactEventKind::Removed, contact);
                    }
                    (None, None) => {}
                }
            }
        }
    }

    /// Retire contacts that were not refreshed this step and age the rest.
    pub fn end_step(&mut self) {
        let mut expired = Vec::new();
        self.contacts.retain_mut(|c| {
            if c.touched {
                c.touched = false;
                true
            } else {
                expired.push(*c);
                false
            }
        });
        if expired.is_empty() {
            return;
        }

        self.index.clear();
        for (i, c) in self.contacts.iter().enumerate() {
            self.index.insert(pair_key(c.collider_a, c.collider_b), i);
        }
        for contact in expired {
            self.notify(ContactEventKind::Removed, contact);
        }
    }

    pub fn drain_events(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Remove one record, keeping creation order and the pair index intact.
    fn remove_at(&mut self, idx: usize) -> Contact {
        let contact = self.contacts.remove(idx);
        self.index.remove(&pair_key(contact.collider_a, contact.collider_b));
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        contact
    }

    fn notify(&mut self, kind: ContactEventKind, contact: Contact) {
        debug!(
            ?kind,
            a = ?contact.collider_a,
            b = ?contact.collider_b,
            "contact"
        );
        if let Some(listener) = self.listener.as_mut() {
            match kind {
                ContactEventKind::Added => listener.on_contact_added(&contact),
                ContactEventKind::Removed => listener.on_contact_removed(&contact),
            }
        }
        self.events.push(ContactEvent { kind, contact });
    }
}

#[inline]
fn pair_key(a: ColliderHandle, b: ColliderHandle) -> (ColliderHandle, ColliderHandle) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Push the dynamic side(s) apart and replace their velocities.
fn resolve(a: &mut Body, b: &mut Body, overlap: Overlap, mat_a: &Material, mat_b: &Material) {
    let a_dynamic = a.body_type().is_dynamic();
    let b_dynamic = b.body_type().is_dynamic();
    let share = if a_dynamic && b_dynamic { 0.5 } else { 1.0 };
    let (va, vb) = (a.linear_velocity(), b.linear_velocity());

    if a_dynamic {
        a.set_linear_velocity(respond(va, vb, overlap.normal, mat_b));
        a.offset(-overlap.mtv * share);
    }
    if b_dynamic {
        b.set_linear_velocity(respond(vb, va, overlap.normal, mat_a));
        b.offset(overlap.mtv * share);
    }
}

/// Velocity after impact: the other body's velocity weighted by restitution,
/// blended with `velocity` reflected about the normal and scaled by the other
/// surface's friction (tangent) and bounce (normal).
pub fn respond(velocity: Vec2, other_velocity: Vec2, normal: Vec2, other: &Material) -> Vec2 {
    let n = normal.normalized();
    let normal_part = n * velocity.dot(n);
    let tangent = velocity - normal_part;
    let e = other.restitution;
    other_velocity * e + (tangent * other.friction - normal_part * other.bounce) * (1.0 - e)
}
