//! Opaque handles consumed from the (external) code generator, §6:
//! "Consumes from code-gen: an `LLVMValueRef`/`LLVMTypeRef` opaque handle
//! type so that the `Any` value envelope can carry them". This crate never
//! interprets them — it only needs to be able to hold and pass them along.

use std::ffi::c_void;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct LlvmValueRef(pub *mut c_void);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct LlvmTypeRef(pub *mut c_void);

// `*mut c_void` is not `Send`/`Sync` by default; the front end is
// single-threaded (§5) and never dereferences these, so it is sound to
// carry them across the one thread that owns the compilation.
unsafe impl Send for LlvmValueRef {}
unsafe impl Send for LlvmTypeRef {}
