//
// Copyright 2026 bjdata Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Container encoding (spec.md §4.3): arrays and objects, cycle detection,
//! counted vs. open-ended mode.

use std::io::Write;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::markers;
use crate::value::{Mapping, Value};

use super::scalar;
use super::{encode_value, Ctx};

/// Pushes `ptr` onto the open-container stack, returning
/// [`Error::CircularReference`] if it's already there. The caller must pop
/// it again (via the returned guard-less pattern: callers call
/// `ctx.open.remove(&ptr)` themselves once the container is fully written,
/// including on every early-return path).
fn enter<W: Write>(ctx: &mut Ctx<'_, W>, ptr: usize) -> Result<()> {
    if !ctx.open.insert(ptr) {
        return Err(Error::CircularReference);
    }
    Ok(())
}

pub(crate) fn encode_array<W: Write>(
    ctx: &mut Ctx<'_, W>,
    items: &Rc<std::cell::RefCell<Vec<Value>>>,
) -> Result<()> {
    let ptr = Rc::as_ptr(items) as usize;
    enter(ctx, ptr)?;

    let result = (|| -> Result<()> {
        scalar::write_byte(ctx.sink, markers::ARRAY_START)?;

        let count = items.borrow().len();
        if ctx.config.counted_containers {
            scalar::write_byte(ctx.sink, markers::CONTAINER_COUNT)?;
            scalar::encode_int(ctx.sink, count as i128, ctx.config.endianness())?;
        }

        // Borrowed fresh per index rather than held across `encode_value`:
        // a cyclic element would otherwise need to re-borrow the same
        // `RefCell` while this borrow is still live.
        for index in 0..count {
            let item = items.borrow()[index].clone();
            encode_value(ctx, &item)?;
        }

        if !ctx.config.counted_containers {
            scalar::write_byte(ctx.sink, markers::ARRAY_END)?;
        }
        Ok(())
    })();

    ctx.open.remove(&ptr);
    result
}

pub(crate) fn encode_object<W: Write>(
    ctx: &mut Ctx<'_, W>,
    entries: &Rc<std::cell::RefCell<Mapping>>,
) -> Result<()> {
    let ptr = Rc::as_ptr(entries) as usize;
    enter(ctx, ptr)?;

    let result = (|| -> Result<()> {
        scalar::write_byte(ctx.sink, markers::OBJECT_START)?;

        let mut pairs: Vec<(String, Value)> = entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if ctx.config.sort_keys {
            pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        }

        if ctx.config.counted_containers {
            scalar::write_byte(ctx.sink, markers::CONTAINER_COUNT)?;
            scalar::encode_int(ctx.sink, pairs.len() as i128, ctx.config.endianness())?;
        }

        for (key, value) in &pairs {
            scalar::encode_key(ctx.sink, key, ctx.config.endianness())?;
            encode_value(ctx, value)?;
        }

        if !ctx.config.counted_containers {
            scalar::write_byte(ctx.sink, markers::OBJECT_END)?;
        }
        Ok(())
    })();

    ctx.open.remove(&ptr);
    result
}
