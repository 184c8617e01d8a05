use std::cell::RefCell;
use std::rc::Rc;

use embedded_storage_async::nor_flash::{
    ErrorType, MultiwriteNorFlash, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

pub const SECTOR_SIZE: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCut;

impl NorFlashError for PowerCut {
    fn kind(&self) -> NorFlashErrorKind {
        NorFlashErrorKind::Other
    }
}

struct Cells {
    data: Vec<u8>,
    writes_left: Option<usize>,
}

/// RAM NOR flash whose program operations can be made to fail from a given one on.
///
/// Clones are handles to the same cells, so a test can keep one while a store owns another.
#[derive(Clone)]
pub struct RamFlash(Rc<RefCell<Cells>>);

impl RamFlash {
    pub fn new(sectors: usize) -> Self {
        Self(Rc::new(RefCell::new(Cells {
            data: vec![0xFF; sectors * SECTOR_SIZE],
            writes_left: None,
        })))
    }

    pub fn sectors(&self) -> usize {
        self.0.borrow().data.len() / SECTOR_SIZE
    }

    /// Independent copy of the current contents, with power on.
    pub fn fork(&self) -> Self {
        Self(Rc::new(RefCell::new(Cells {
            data: self.0.borrow().data.clone(),
            writes_left: None,
        })))
    }

    pub fn cut_power_after(&self, writes: usize) {
        self.0.borrow_mut().writes_left = Some(writes);
    }

    pub fn restore_power(&self) {
        self.0.borrow_mut().writes_left = None;
    }
}

impl ErrorType for RamFlash {
    type Error = PowerCut;
}

impl ReadNorFlash for RamFlash {
    const READ_SIZE: usize = 1;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        bytes.copy_from_slice(&self.0.borrow().data[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.0.borrow().data.len()
    }
}

impl NorFlash for RamFlash {
    const WRITE_SIZE: usize = 4;

    const ERASE_SIZE: usize = SECTOR_SIZE;

    async fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        self.0.borrow_mut().data[from as usize..to as usize].fill(0xFF);
        Ok(())
    }

    async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut cells = self.0.borrow_mut();
        match cells.writes_left {
            Some(0) => return Err(PowerCut),
            Some(ref mut left) => *left -= 1,
            None => {}
        }
        let start = offset as usize;
        for (cell, byte) in cells.data[start..start + bytes.len()].iter_mut().zip(bytes) {
            *cell &= byte;
        }
        Ok(())
    }
}

impl MultiwriteNorFlash for RamFlash {}
