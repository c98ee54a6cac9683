// ==========================================
// 城市走廊通行决策系统 - 走廊距离
// ==========================================

use crate::config::RouteConfig;
use crate::domain::corridor::CorridorId;

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// 球面大圆距离（km）
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// 走廊间行驶距离
///
/// - 任一走廊坐标未知: 回退距离
/// - 直线距离过短（同走廊内配送）: 短途距离
pub fn corridor_distance_km(route: &RouteConfig, origin: &CorridorId, destination: &CorridorId) -> f64 {
    match (route.coordinate(origin), route.coordinate(destination)) {
        (Some((lat1, lon1)), Some((lat2, lon2))) => {
            let d = haversine_km(lat1, lon1, lat2, lon2);
            if d < route.short_trip_threshold_km {
                route.short_trip_distance_km
            } else {
                d
            }
        }
        _ => route.fallback_distance_km,
    }
}
