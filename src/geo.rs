/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two `(lat, lon)` points given
/// in degrees, by the haversine formula.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat_one, lon_one) = from;
    let (lat_two, lon_two) = to;

    let d_lat = (lat_two - lat_one).to_radians();
    let d_lon = (lon_two - lon_one).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + (d_lon / 2.0).sin().powi(2) * lat_one.to_radians().cos() * lat_two.to_radians().cos();

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
