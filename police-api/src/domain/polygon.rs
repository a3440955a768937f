//! Polygon encoding for area queries.

/// Encode `(latitude, longitude)` points as the API's `poly` parameter:
/// `lat,lng` pairs joined by colons, in the given order.
///
/// The API closes the polygon itself, so the first point need not be
/// repeated at the end.
pub fn encode_polygon(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(lat, lng)| format!("{lat},{lng}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn decode(poly: &str) -> Vec<(f64, f64)> {
        if poly.is_empty() {
            return Vec::new();
        }
        poly.split(':')
            .map(|pair| {
                let (lat, lng) = pair.split_once(',').unwrap();
                (lat.parse().unwrap(), lng.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn joins_pairs_with_colons() {
        let poly = encode_polygon(&[(52.268, 0.543), (52.794, 0.238), (52.13, 0.478)]);
        assert_eq!(poly, "52.268,0.543:52.794,0.238:52.13,0.478");
    }

    #[test]
    fn negative_longitudes_keep_sign() {
        assert_eq!(encode_polygon(&[(52.6, -1.14)]), "52.6,-1.14");
    }

    #[test]
    fn empty_polygon() {
        assert_eq!(encode_polygon(&[]), "");
    }

    proptest! {
        #[test]
        fn decodes_back_to_the_same_points(
            points in prop::collection::vec((-90.0f64..90.0, -180.0f64..180.0), 0..12)
        ) {
            prop_assert_eq!(decode(&encode_polygon(&points)), points);
        }
    }
}
