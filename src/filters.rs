//! Pre-pass observation filters.
//!
//! Thinning applied before grouping: selecting the observation types a pass
//! should consider and capping the number of BUFR messages retained per
//! station. Both operate on whole observations and never alter values.

use hashbrown::{HashMap, HashSet};

use crate::models::Observation;

/// Retain only observations whose type code appears in `types`.
///
/// An empty selection keeps everything.
pub fn select_types(observations: Vec<Observation>, types: &[u16]) -> Vec<Observation> {
    if types.is_empty() {
        return observations;
    }
    observations
        .into_iter()
        .filter(|ob| types.contains(&ob.type_code))
        .collect()
}

/// Cap the number of distinct messages kept per station.
///
/// The first `max_messages` message identifiers seen for each station are
/// kept, in input order, along with every observation belonging to them.
/// Later messages from the same station are dropped whole; observations are
/// never split across the cut.
pub fn limit_messages_per_station(
    observations: Vec<Observation>,
    max_messages: usize,
) -> Vec<Observation> {
    let mut kept: HashMap<String, HashSet<u32>> = HashMap::new();
    observations
        .into_iter()
        .filter(|ob| {
            let messages = kept.entry(ob.station_id.clone()).or_default();
            if messages.contains(&ob.message_id) {
                return true;
            }
            if messages.len() < max_messages {
                messages.insert(ob.message_id);
                return true;
            }
            false
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn ob(type_code: u16, station: &str, message: u32) -> Observation {
        let mut ob = test_utils::thermo_ob(40.0, -97.0, 850.0, 10.0, 0.0);
        ob.type_code = type_code;
        ob.station_id = station.to_string();
        ob.message_id = message;
        ob
    }

    #[test]
    fn select_types_filters_by_code() {
        let observations = vec![ob(136, "A", 1), ob(236, "A", 1), ob(120, "B", 1)];
        let selected = select_types(observations, &[136, 236]);
        assert_eq!(2, selected.len());
        assert!(selected.iter().all(|ob| ob.type_code != 120));
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let observations = vec![ob(136, "A", 1), ob(120, "B", 1)];
        assert_eq!(2, select_types(observations, &[]).len());
    }

    #[test]
    fn message_cap_keeps_first_messages_whole() {
        let observations = vec![
            ob(136, "A", 1),
            ob(136, "A", 1),
            ob(136, "A", 2),
            ob(136, "A", 3),
            ob(136, "B", 7),
        ];
        let kept = limit_messages_per_station(observations, 2);
        assert_eq!(4, kept.len());
        // Message 3 dropped; both rows of message 1 survive.
        assert!(kept.iter().all(|ob| !(ob.station_id == "A" && ob.message_id == 3)));
        assert_eq!(
            2,
            kept.iter()
                .filter(|ob| ob.station_id == "A" && ob.message_id == 1)
                .count()
        );
        // Other stations count separately.
        assert!(kept.iter().any(|ob| ob.station_id == "B"));
    }
}
