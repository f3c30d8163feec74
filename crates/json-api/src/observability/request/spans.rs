//! Route names for spans and metrics.

use uuid::Uuid;

/// Replace id segments so every order or product shares one route label.
pub(super) fn normalise_route(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_collapsed() {
        let id = Uuid::now_v7();

        assert_eq!(normalise_route(&format!("/orders/{id}/receipt")), "/orders/{id}/receipt");
        assert_eq!(normalise_route("/cart/coupon"), "/cart/coupon");
        assert_eq!(normalise_route("/"), "/");
    }
}
