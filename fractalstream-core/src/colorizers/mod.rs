//! Named, pluggable colorizers.
//!
//! A colorizer maps one iteration sample (plus the calculation's max
//! iterations) to an RGB triple. Colorizers are pure: the same inputs always
//! give the same colour, so a picture can be recoloured without refetching.

mod schemes;

pub use schemes::{builtin_schemes, DEFAULT_SCHEME};

use crate::error::RegistryError;
use std::fmt;
use std::rc::Rc;

pub type Rgb = [u8; 3];

/// Shared handle to a named colour function. Cloning shares the function.
#[derive(Clone)]
pub struct Colorizer {
    name: Rc<str>,
    func: Rc<dyn Fn(u32, u32) -> Rgb>,
}

impl Colorizer {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(u32, u32) -> Rgb + 'static,
    {
        Self {
            name: Rc::from(name),
            func: Rc::new(func),
        }
    }

    /// Colours everything black. Used before any scheme is chosen.
    pub fn blank() -> Self {
        Self::new("", |_, _| [0, 0, 0])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn colorize(&self, sample: u32, max_iterations: u32) -> Rgb {
        (self.func)(sample, max_iterations)
    }

    /// True when both handles share the same function.
    pub fn ptr_eq(&self, other: &Colorizer) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Colorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Colorizer").field("name", &self.name).finish()
    }
}

/// Convert a colour intensity to a channel value, clamped to `[0, 255]`.
///
/// Halves round to even, as a `Uint8ClampedArray` store does. NaN maps to 0.
#[inline]
pub(crate) fn channel(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round_ties_even().clamp(0.0, 255.0) as u8
    }
}

/// Ordered set of colour schemes, looked up by name.
///
/// Registration order is kept; the first scheme is the fallback for unknown
/// names.
#[derive(Clone, Debug, Default)]
pub struct ColorSchemeRegistry {
    schemes: Vec<Colorizer>,
}

impl ColorSchemeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in schemes, default first.
    pub fn with_builtin_schemes() -> Self {
        Self {
            schemes: builtin_schemes(),
        }
    }

    /// Add a scheme. A name that is already taken is replaced in place.
    pub fn register<F>(&mut self, name: &str, func: F) -> Result<(), RegistryError>
    where
        F: Fn(u32, u32) -> Rgb + 'static,
    {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let colorizer = Colorizer::new(name, func);
        match self.schemes.iter_mut().find(|c| c.name() == name) {
            Some(existing) => *existing = colorizer,
            None => self.schemes.push(colorizer),
        }
        Ok(())
    }

    /// The scheme called `name`, or the default scheme if there is none.
    pub fn resolve(&self, name: &str) -> Colorizer {
        self.schemes
            .iter()
            .find(|c| c.name() == name)
            .or_else(|| self.schemes.first())
            .cloned()
            .unwrap_or_else(Colorizer::blank)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemes.iter().any(|c| c.name() == name)
    }

    /// Scheme names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemes.iter().map(|c| c.name())
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}
