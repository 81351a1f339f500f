use serde_json::json;
use serde_json::Map as JSMap;

use crate::mapping::*;

fn individual_to_json(ind: &Individual) -> JSValue {
    json!({
        "id": ind.id,
        "name": ind.full_name(),
        "lat": ind.lat,
        "lng": ind.lng,
        "address": ind.address,
        "neighbourhood": ind.neighbourhood,
    })
}

fn marker_to_json(m: &ActivityMarker) -> JSValue {
    json!({
        "id": m.id,
        "lat": m.lat,
        "lng": m.lng,
        "activityType": m.activity_type_code(),
        "facilitatorName": m.facilitator_name,
        "address": m.address,
        "activityName": m.activity_name,
        "facilitators": m.facilitators_raw,
    })
}

fn activity_row_to_json(a: &ActivityRecord) -> JSValue {
    json!({
        "activityType": a.activity_type_raw,
        "activityName": a.activity_name,
        "facilitators": a.facilitators_raw,
    })
}

/// The full state of a session, as written by the command line tool.
pub fn build_summary_js(session: &Session) -> JSValue {
    let snapshot = session.individuals();
    let activities = session.activities();

    let mut type_counts: JSMap<String, JSValue> = JSMap::new();
    for t in ActivityType::ALL.iter() {
        let count = activities.type_counts.get(t).copied().unwrap_or(0);
        type_counts.insert(t.code().to_string(), json!(count));
    }

    let neighbourhoods: Vec<JSValue> = session
        .neighbourhood_counts()
        .into_iter()
        .map(|(name, count)| json!({"name": name, "individuals": count}))
        .collect();

    json!({
        "individuals": snapshot.individuals.iter().map(individual_to_json).collect::<Vec<JSValue>>(),
        "markers": activities.markers.iter().map(marker_to_json).collect::<Vec<JSValue>>(),
        "neighbourhoods": neighbourhoods,
        "typeCounts": type_counts,
        "noFacilitators": activities.no_facilitators.iter().map(activity_row_to_json).collect::<Vec<JSValue>>(),
        "facilitatorNotFound": activities.facilitator_not_found.iter().map(activity_row_to_json).collect::<Vec<JSValue>>(),
        "failedAddresses": {
            "count": session.failed_count(),
            "message": session.failure_message(),
        },
    })
}
