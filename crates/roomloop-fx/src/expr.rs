//! Signal-to-FFmpeg-expression codegen.
//!
//! This is the batch-path interpreter of [`Signal`]: the same tree the
//! timeline samples numerically is rendered here to FFmpeg's expression
//! syntax. The match below is exhaustive, so adding a signal variant
//! without teaching the codegen about it is a compile error.

use roomloop_ir::Signal;

/// Render a signal as an FFmpeg expression over the variable `t`.
pub fn render(signal: &Signal) -> String {
    render_with(signal, "t")
}

/// Render a signal with a custom time-variable name.
///
/// Most filters expose time as `t`, but `zoompan` calls it `it`.
pub fn render_with(signal: &Signal, time_var: &str) -> String {
    // A tree that folds to a constant prints as a bare number.
    if let Some(c) = signal.as_const() {
        return format_number(c);
    }
    match signal {
        Signal::Time => time_var.to_string(),
        Signal::Const(v) => format_number(*v),
        Signal::Sin(x) => format!("sin({})", render_with(x, time_var)),
        Signal::Cos(x) => format!("cos({})", render_with(x, time_var)),
        Signal::Add(a, b) => format!(
            "({}+{})",
            render_with(a, time_var),
            render_with(b, time_var)
        ),
        Signal::Sub(a, b) => format!(
            "({}-{})",
            render_with(a, time_var),
            render_with(b, time_var)
        ),
        Signal::Mul(a, b) => format!(
            "({}*{})",
            render_with(a, time_var),
            render_with(b, time_var)
        ),
        Signal::Mod(a, b) => {
            // FFmpeg's mod() keeps the dividend's sign; nest it to get the
            // euclidean wrap eval() uses.
            let a = render_with(a, time_var);
            let b = render_with(b, time_var);
            format!("mod((mod({},{})+{}),{})", a, b, b, b)
        }
        Signal::Max(x, floor) => format!(
            "max({},{})",
            render_with(x, time_var),
            format_number(*floor)
        ),
    }
}

/// Print a float the FFmpeg expression parser accepts: plain decimal
/// notation, no exponent.
pub(crate) fn format_number(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        let s = format!("{:.12}", v);
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomloop_ir::signal::{breathing_scale, flicker, lift_offset};

    /// Tiny reference interpreter for rendered expressions, used to prove
    /// eval() and render() implement the same math. It only understands
    /// the shapes our codegen produces.
    fn eval_expr(expr: &str, t: f64) -> f64 {
        let mut parser = ExprParser {
            chars: expr.as_bytes(),
            pos: 0,
            t,
        };
        let v = parser.parse_value();
        assert_eq!(parser.pos, parser.chars.len(), "unparsed input in {}", expr);
        v
    }

    struct ExprParser<'a> {
        chars: &'a [u8],
        pos: usize,
        t: f64,
    }

    impl ExprParser<'_> {
        fn parse_value(&mut self) -> f64 {
            match self.peek() {
                b'(' => {
                    self.pos += 1;
                    let lhs = self.parse_value();
                    let op = self.chars[self.pos];
                    self.pos += 1;
                    let rhs = self.parse_value();
                    assert_eq!(self.chars[self.pos], b')');
                    self.pos += 1;
                    match op {
                        b'+' => lhs + rhs,
                        b'-' => lhs - rhs,
                        b'*' => lhs * rhs,
                        other => panic!("unexpected operator {}", other as char),
                    }
                }
                b's' | b'c' | b'm' => self.parse_call(),
                b't' => {
                    self.pos += 1;
                    self.t
                }
                _ => self.parse_number(),
            }
        }

        fn parse_call(&mut self) -> f64 {
            let start = self.pos;
            while self.chars[self.pos] != b'(' {
                self.pos += 1;
            }
            let name = std::str::from_utf8(&self.chars[start..self.pos]).unwrap();
            self.pos += 1;
            let mut args = vec![self.parse_value()];
            while self.chars[self.pos] == b',' {
                self.pos += 1;
                args.push(self.parse_value());
            }
            assert_eq!(self.chars[self.pos], b')');
            self.pos += 1;
            match name {
                "sin" => args[0].sin(),
                "cos" => args[0].cos(),
                "max" => args[0].max(args[1]),
                "mod" => args[0] % args[1],
                other => panic!("unknown function {}", other),
            }
        }

        fn parse_number(&mut self) -> f64 {
            let start = self.pos;
            while self.pos < self.chars.len()
                && matches!(self.chars[self.pos], b'0'..=b'9' | b'.' | b'-')
            {
                self.pos += 1;
            }
            std::str::from_utf8(&self.chars[start..self.pos])
                .unwrap()
                .parse()
                .unwrap()
        }

        fn peek(&self) -> u8 {
            self.chars[self.pos]
        }
    }

    #[test]
    fn test_constant_folds_to_number() {
        assert_eq!(render(&Signal::constant(1.0)), "1.0");
        assert_eq!(render(&flicker(0.0)), "1.0");
    }

    #[test]
    fn test_time_variable_name() {
        let s = Signal::time().scaled(2.0);
        assert_eq!(render(&s), "(t*2.0)");
        assert_eq!(render_with(&s, "it"), "(it*2.0)");
    }

    #[test]
    fn test_no_exponent_notation() {
        let s = Signal::time().scaled(1e-4);
        let expr = render(&s);
        assert!(!expr.contains('e'), "expression uses exponent: {}", expr);
        assert!(expr.contains("0.0001"));
    }

    #[test]
    fn test_breathing_expr_matches_eval() {
        let s = breathing_scale(4.0, 0.02);
        let expr = render(&s);
        for i in 0..240 {
            let t = i as f64 / 30.0;
            assert!(
                (eval_expr(&expr, t) - s.eval(t)).abs() < 1e-9,
                "divergence at t={} for {}",
                t,
                expr
            );
        }
    }

    #[test]
    fn test_flicker_expr_matches_eval() {
        let s = flicker(1.0);
        let expr = render(&s);
        for i in 0..240 {
            let t = i as f64 / 30.0;
            assert!((eval_expr(&expr, t) - s.eval(t)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lift_expr_matches_eval_including_wrap() {
        let s = lift_offset(32.4, 2160.0);
        let expr = render(&s);
        // The nested mod keeps the FFmpeg-side result euclidean, so both
        // interpreters agree across the wrap.
        for i in 0..500 {
            let t = i as f64 * 0.91;
            assert!((eval_expr(&expr, t) - s.eval(t)).abs() < 1e-6);
        }
    }
}
