use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};
use crate::geom::GeomKernel;
use crate::value::scalar::clamp_fraction;
use crate::value::{BaseKind, BaseValue};

macro_rules! double_n {
    ($name:ident, $n:expr, $kind:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name(pub [f64; $n]);

        impl $name {
            pub fn new(components: [f64; $n]) -> Self {
                $name(components)
            }

            pub fn components(&self) -> &[f64; $n] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "(")?;
                for (i, c) in self.0.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
        }

        impl BaseValue for $name {
            const KIND: BaseKind = $kind;
            const CONTINUOUS: bool = true;

            fn base_eq(&self, other: &Self) -> bool {
                self.0.iter().zip(other.0.iter()).all(|(a, b)| !a.is_nan() && !b.is_nan() && a == b)
            }

            fn base_cmp(&self, other: &Self) -> Option<Ordering> {
                for (a, b) in self.0.iter().zip(other.0.iter()) {
                    match a.partial_cmp(b)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(Ordering::Equal)
            }

            fn interpolate(a: &Self, b: &Self, fraction: f64, _kernel: &dyn GeomKernel) -> Result<Self> {
                let fraction = clamp_fraction(fraction)?;
                let mut out = [0.0; $n];
                for i in 0..$n {
                    out[i] = a.0[i] + (b.0[i] - a.0[i]) * fraction;
                }
                Ok($name(out))
            }

            fn encode(&self, buf: &mut Vec<u8>) {
                for c in &self.0 {
                    buf.extend_from_slice(&c.to_le_bytes());
                }
            }

            fn decode(buf: &[u8]) -> Result<(Self, usize)> {
                let mut out = [0.0; $n];
                for i in 0..$n {
                    let bytes: [u8; 8] = buf
                        .get(i * 8..i * 8 + 8)
                        .and_then(|s| s.try_into().ok())
                        .ok_or_else(|| Error::Internal(concat!("truncated ", stringify!($name)).into()))?;
                    out[i] = f64::from_le_bytes(bytes);
                }
                Ok(($name(out), $n * 8))
            }
        }
    };
}

double_n!(Double2, 2, BaseKind::Double2, "Auxiliary 2-tuple of `f64`, used by `avg` aggregation as `(sum, duration)`.");
double_n!(Double3, 3, BaseKind::Double3, "Auxiliary 3-tuple base type (spec §3.1).");
double_n!(Double4, 4, BaseKind::Double4, "Auxiliary 4-tuple base type (spec §3.1).");
