use super::*;

#[test]
fn whole_second_holds_are_exact() {
    for i in 0..5 {
        assert_eq!(frames_for_image(i, 1.0, Fps::CAPTURE), 30);
    }
    assert_eq!(total_frames(3, 1.0, Fps::CAPTURE), 90);
}

#[test]
fn fractional_holds_never_drift() {
    let fps = Fps::new(30, 1).unwrap();
    let d = 1.0 / 7.0;
    let n = 50;
    let sum: u64 = (0..n).map(|i| frames_for_image(i, d, fps)).sum();
    assert_eq!(sum, total_frames(n, d, fps));
    assert_eq!(sum, (n as f64 * d * 30.0).round() as u64);
}

#[test]
fn half_second_steps() {
    let fps = Fps::CAPTURE;
    assert_eq!(frames_for_image(0, 2.5, fps), 75);
    assert_eq!(total_frames(4, 2.5, fps), 300);
}

#[test]
fn nominal_duration_is_count_times_hold() {
    assert_eq!(nominal_duration_secs(3, 1.0), 3.0);
    assert_eq!(nominal_duration_secs(1, 2.0), 2.0);
    assert_eq!(nominal_duration_secs(0, 5.0), 0.0);
}
