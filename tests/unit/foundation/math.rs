use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn over_with_opaque_source_replaces_destination() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[200, 100, 50, 255], 1.0);
    assert_eq!(dst, vec![200, 100, 50, 255]);
}

#[test]
fn over_with_zero_opacity_is_noop() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[200, 100, 50, 255], 0.0);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn over_with_partial_opacity_blends() {
    let mut dst = vec![0u8, 0, 0, 255];
    premul_over_in_place(&mut dst, &[255, 255, 255, 255], 0.5);
    assert!(dst[0] > 120 && dst[0] < 135);
    assert_eq!(dst[3], 255);
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![255u8, 255, 255, 0, 255, 0, 0, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[0, 0, 0, 0]);
    assert_eq!(px[4], 128);
    assert_eq!(px[7], 128);
}
