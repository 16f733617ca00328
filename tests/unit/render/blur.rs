use super::*;

#[test]
fn kernel_sums_to_one_in_q16() {
    for (r, s) in [(1, 0.5), (15, 5.0), (4, 1.3)] {
        let k = gaussian_kernel_q16(r, s).unwrap();
        assert_eq!(k.len(), (2 * r + 1) as usize);
        assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
        assert_eq!(k[0], k[k.len() - 1]);
    }
}

#[test]
fn radius_zero_kernel_is_identity() {
    let k = gaussian_kernel_q16(0, 0.0).unwrap();
    let mut buf = vec![10, 20, 30, 40, 50, 60, 70, 80];
    let before = buf.clone();
    blur_rgba8_premul_in_place(&mut buf, 2, 1, &k);
    assert_eq!(buf, before);
}

#[test]
fn constant_image_is_unchanged() {
    let k = gaussian_kernel_q16(3, 1.0).unwrap();
    let mut buf = [9u8, 18, 27, 200].repeat(5 * 4);
    let before = buf.clone();
    blur_rgba8_premul_in_place(&mut buf, 5, 4, &k);
    assert_eq!(buf, before);
}

#[test]
fn blur_spreads_a_single_pixel() {
    let k = gaussian_kernel_q16(radius_for_sigma(1.0), 1.0).unwrap();
    let (w, h) = (7u32, 7u32);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    let center = ((3 * w + 3) * 4) as usize;
    buf[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);
    blur_rgba8_premul_in_place(&mut buf, w, h, &k);
    assert!(buf[center + 3] < 255);
    let neighbour = ((3 * w + 4) * 4) as usize;
    assert!(buf[neighbour + 3] > 0);
}

#[test]
fn shadow_sigma_is_half_the_blur() {
    assert_eq!(shadow_sigma(10.0), 5.0);
    assert_eq!(radius_for_sigma(5.0), 15);
    assert_eq!(radius_for_sigma(0.0), 0);
}

#[test]
fn invalid_sigma_is_rejected() {
    assert!(gaussian_kernel_q16(2, f32::NAN).is_err());
    assert!(gaussian_kernel_q16(2, -1.0).is_err());
}
