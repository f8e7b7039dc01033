//! Vector types accepted for variable values and returned for residuals.
use num_complex::Complex64;

/// A trait for vector-like containers of complex numbers.
///
/// This trait lets an [`EquationSystem`](crate::system::EquationSystem) read
/// variable values from, and write residuals into, whatever vector type the
/// host already works with. Every implementation exposes its storage as a
/// contiguous slice.
///
/// # Examples
///
/// ```rust
/// use complex_eqsolve::prelude::ComplexVector;
/// use num_complex::Complex64;
///
/// let mut vec: Vec<Complex64> = ComplexVector::zeros(2);
/// vec.as_mut_slice()[1] = Complex64::new(0.0, 1.0);
/// assert_eq!(vec.as_slice()[1].im, 1.0);
/// ```
pub trait ComplexVector {
    /// Returns a reference to the vector's data as a slice.
    fn as_slice(&self) -> &[Complex64];

    /// Returns a mutable reference to the vector's data as a slice.
    fn as_mut_slice(&mut self) -> &mut [Complex64];

    /// Creates a new vector of the specified length filled with zeros.
    fn zeros(len: usize) -> Self;

    /// Returns the length of the vector.
    fn len(&self) -> usize;

    /// Checks if the vector is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ComplexVector for Vec<Complex64> {
    fn as_slice(&self) -> &[Complex64] {
        self
    }

    fn as_mut_slice(&mut self) -> &mut [Complex64] {
        self
    }

    fn zeros(len: usize) -> Self {
        vec![Complex64::new(0.0, 0.0); len]
    }

    fn len(&self) -> usize {
        self.len()
    }
}

/// Implementation for nalgebra's dynamic vector, the type the Newton step is
/// solved in.
///
/// ```rust
/// use complex_eqsolve::prelude::ComplexVector;
/// use nalgebra::DVector;
/// use num_complex::Complex64;
///
/// let mut vec = <DVector<Complex64> as ComplexVector>::zeros(3);
/// ComplexVector::as_mut_slice(&mut vec)[0] = Complex64::new(1.0, 0.0);
/// assert_eq!(vec[0].re, 1.0);
/// ```
impl ComplexVector for nalgebra::DVector<Complex64> {
    fn as_slice(&self) -> &[Complex64] {
        nalgebra::DVector::as_slice(self)
    }

    fn as_mut_slice(&mut self) -> &mut [Complex64] {
        nalgebra::DVector::as_mut_slice(self)
    }

    fn zeros(len: usize) -> Self {
        nalgebra::DVector::from_element(len, Complex64::new(0.0, 0.0))
    }

    fn len(&self) -> usize {
        nalgebra::DVector::len(self)
    }
}

/// Implementation for ndarray's 1-dimensional array.
///
/// Arrays built by this crate are always in standard layout, so the slice
/// view cannot fail for them. A non-contiguous view is rejected with a panic,
/// since the trait has no error channel.
#[cfg(feature = "ndarray")]
impl ComplexVector for ndarray::Array1<Complex64> {
    fn as_slice(&self) -> &[Complex64] {
        ndarray::Array1::as_slice(self).unwrap_or_else(|| panic!("array is not contiguous"))
    }

    fn as_mut_slice(&mut self) -> &mut [Complex64] {
        ndarray::Array1::as_slice_mut(self).unwrap_or_else(|| panic!("array is not contiguous"))
    }

    fn zeros(len: usize) -> Self {
        ndarray::Array1::from_elem(len, Complex64::new(0.0, 0.0))
    }

    fn len(&self) -> usize {
        ndarray::Array1::len(self)
    }
}
