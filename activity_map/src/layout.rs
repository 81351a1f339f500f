use std::f64::consts::PI;

use crate::config::{ActivityMarker, LayoutSettings};
use crate::facilitators::{FacilitatorAssignments, NameIndex};

/// Offset (in degrees of latitude, longitude) of slot `index` on a ring of `count` slots.
///
/// Slot 0 sits at angle 0, so even a single marker is moved off the home point.
pub fn ring_offset(index: usize, count: usize, radius: f64) -> (f64, f64) {
    let angle = 2.0 * PI * (index as f64) / (count.max(1) as f64);
    (angle.sin() * radius, angle.cos() * radius)
}

/// Stable identifier of a marker. The same inputs always give the same id.
pub fn marker_id(normalized_name: &str, facilitator_name: &str, activity_name: &str, index: usize) -> String {
    crate::content_id(&[
        normalized_name.to_string(),
        facilitator_name.to_string(),
        activity_name.to_string(),
        index.to_string(),
    ])
}

/// Places the activities of each facilitator on a ring around their home.
///
/// Facilitators without a known home are left out.
pub fn layout_markers(
    assignments: &FacilitatorAssignments,
    homes: &NameIndex<'_>,
    settings: &LayoutSettings,
) -> Vec<ActivityMarker> {
    let mut markers: Vec<ActivityMarker> = Vec::new();
    for (name, activities) in assignments.iter() {
        let home = match homes.get(name) {
            Some(h) => h,
            None => continue,
        };
        let count = activities.len();
        for (idx, a) in activities.iter().enumerate() {
            let (dlat, dlng) = ring_offset(idx, count, settings.radius);
            markers.push(ActivityMarker {
                id: marker_id(name, &a.facilitator_name, &a.activity_name, idx),
                lat: home.lat + dlat,
                lng: home.lng + dlng,
                activity_type: a.activity_type,
                facilitator_name: a.facilitator_name.clone(),
                address: home.address.clone(),
                activity_name: a.activity_name.clone(),
                facilitators_raw: a.facilitators_raw.clone(),
            });
        }
    }
    markers
}
