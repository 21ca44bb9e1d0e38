use std::{
  cell::{BorrowMutError, Ref, RefCell, RefMut},
  rc::{Rc, Weak},
};

pub trait RcDeref {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a>;
}

pub trait RcDerefMut {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a>;
}

/// Single-threaded shared mutable cell, the building block of every
/// subscriber and outer state in this crate.
#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

/// Non-owning counterpart of [`MutRc`].
pub struct WeakMutRc<T>(Weak<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  /// Mutable access that fails instead of panicking when the cell is already
  /// borrowed, used to detect re-entrant delivery.
  #[inline]
  pub fn try_rc_deref_mut(&self) -> Result<RefMut<'_, T>, BorrowMutError> {
    self.0.try_borrow_mut()
  }

  pub fn downgrade(&self) -> WeakMutRc<T> { WeakMutRc(Rc::downgrade(&self.0)) }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<T> WeakMutRc<T> {
  pub fn upgrade(&self) -> Option<MutRc<T>> { self.0.upgrade().map(MutRc) }

  #[inline]
  pub fn ptr_eq(&self, other: &MutRc<T>) -> bool { std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&other.0)) }
}

impl<T> From<T> for MutRc<T> {
  fn from(t: T) -> Self { Self::own(t) }
}

impl<T> RcDeref for MutRc<T> {
  type Target<'a>
    = Ref<'a, T>
  where
    Self: 'a;
  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a> { self.0.borrow() }
}

impl<T> RcDerefMut for MutRc<T> {
  type Target<'a>
    = RefMut<'a, T>
  where
    Self: 'a;
  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a> { self.0.borrow_mut() }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Clone for WeakMutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}
