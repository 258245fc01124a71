//! Explicit compositing formulas on premultiplied pixels.

use crate::components::color::Rgba;

/// How a source pixel is combined with the destination pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Replace the destination.
    Copy,
    /// Standard source-over alpha blending.
    #[default]
    Normal,
    /// `dst += src` per channel, saturating at 1.0.
    /// For straight colors this is `dst += src * src_alpha`.
    Additive,
    /// `dst *= 1 - src_alpha`. Cuts holes.
    Erase,
    /// Source drawn only where the destination is opaque: `dst = src * dst_alpha`.
    KeepWhereOpaque,
    /// Multiplies the destination by the source's per-channel transmission
    /// `1 - a + src_c * (1 - a / 2)` (`a` = source alpha). Every channel is
    /// attenuated whenever `a > 0`, even under a white tint. Opaque black
    /// behaves like `Erase`.
    Tint,
}

/// Combine `src` into `dst` using `mode`.
#[inline]
pub fn composite(dst: Rgba, src: Rgba, mode: BlendMode) -> Rgba {
    match mode {
        BlendMode::Copy => src,
        BlendMode::Normal => {
            let k = 1.0 - src.a;
            Rgba::new(
                src.r + dst.r * k,
                src.g + dst.g * k,
                src.b + dst.b * k,
                src.a + dst.a * k,
            )
        }
        BlendMode::Additive => Rgba::new(
            (dst.r + src.r).min(1.0),
            (dst.g + src.g).min(1.0),
            (dst.b + src.b).min(1.0),
            (dst.a + src.a).min(1.0),
        ),
        BlendMode::Erase => dst.scale(1.0 - src.a),
        BlendMode::KeepWhereOpaque => src.scale(dst.a),
        BlendMode::Tint => {
            let pass = 1.0 - src.a;
            let colored = 1.0 - src.a / 2.0;
            let tr = (pass + src.r * colored).clamp(0.0, 1.0);
            let tg = (pass + src.g * colored).clamp(0.0, 1.0);
            let tb = (pass + src.b * colored).clamp(0.0, 1.0);
            let ta = tr.max(tg).max(tb);
            Rgba::new(dst.r * tr, dst.g * tg, dst.b * tb, dst.a * ta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_RED: Rgba = Rgba::new(0.5, 0.0, 0.0, 0.5);
    const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    #[test]
    fn normal_over_transparent_is_source() {
        assert_eq!(composite(Rgba::TRANSPARENT, HALF_RED, BlendMode::Normal), HALF_RED);
    }

    #[test]
    fn additive_saturates() {
        let out = composite(WHITE, HALF_RED, BlendMode::Additive);
        assert_eq!(out, WHITE);
        let out = composite(HALF_RED, HALF_RED, BlendMode::Additive);
        assert_eq!(out, Rgba::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn erase_scales_by_inverse_alpha() {
        let out = composite(WHITE, HALF_RED, BlendMode::Erase);
        assert_eq!(out, Rgba::new(0.5, 0.5, 0.5, 0.5));
        let gone = composite(WHITE, WHITE, BlendMode::Erase);
        assert_eq!(gone, Rgba::TRANSPARENT);
    }

    #[test]
    fn keep_where_opaque_multiplies_alpha() {
        let out = composite(Rgba::new(0.0, 0.0, 0.0, 0.5), WHITE, BlendMode::KeepWhereOpaque);
        assert_eq!(out, Rgba::new(0.5, 0.5, 0.5, 0.5));
        let none = composite(Rgba::TRANSPARENT, WHITE, BlendMode::KeepWhereOpaque);
        assert_eq!(none, Rgba::TRANSPARENT);
    }

    #[test]
    fn tint_with_opaque_black_matches_erase() {
        let black = Rgba::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(
            composite(WHITE, black, BlendMode::Tint),
            composite(WHITE, black, BlendMode::Erase)
        );
    }

    #[test]
    fn tint_colors_transmitted_light() {
        let out = composite(WHITE, HALF_RED, BlendMode::Tint);
        assert!((out.r - 0.875).abs() < 1e-6);
        assert!((out.g - 0.5).abs() < 1e-6);
        assert!((out.b - 0.5).abs() < 1e-6);
        assert!((out.a - 0.875).abs() < 1e-6);
    }

    #[test]
    fn white_tint_still_dims() {
        let half_white = Rgba::new(0.5, 0.5, 0.5, 0.5);
        let out = composite(WHITE, half_white, BlendMode::Tint);
        assert!(out.r < 1.0 && out.g < 1.0 && out.b < 1.0);
        assert!(out.r > 0.0);
        assert_eq!(out.r, out.g);
    }

    #[test]
    fn opaque_color_tints_without_blocking() {
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let out = composite(WHITE, red, BlendMode::Tint);
        assert!((out.r - 0.5).abs() < 1e-6);
        assert_eq!(out.g, 0.0);
        assert_eq!(out.b, 0.0);
    }
}
