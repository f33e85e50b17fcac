// Copyright (c) 2026 the idpack authors.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Identifier registries: create, recycle, and track typed ids.
//!
//! A registry hands out ids from a fixed or growable range and recycles
//! removed ones, always reusing the lowest free slot first. The free slots
//! live in a bitset with 1 = free, since finding the first set bit is the
//! cheapest scan a CPU offers.
//!
//! Pick the variant by workload:
//!
//! * [`IdRegistry`]: fixed capacity, explicit exhaustion.
//! * [`GrowableIdRegistry`]: grows at least twofold when exhausted.
//! * [`HierIdRegistry`]: hierarchical free set for large sparse ranges and
//!   bulk allocation.
//!
//! [`IdOwner`] and [`IdRefCount`] add lifetime bookkeeping on top, and
//! [`IdSet`] is a plain bitset keyed by ids.
//!
//! Nothing here is thread-safe; wrap a registry in a lock to share it.

pub mod grow;
pub mod hier;
pub mod owner;
pub mod refcount;
pub mod registry;
pub mod set;

pub use grow::GrowableIdRegistry;
pub use hier::HierIdRegistry;
pub use owner::IdOwner;
pub use refcount::{IdRefCount, RefCount};
pub use registry::IdRegistry;
pub use set::IdSet;
