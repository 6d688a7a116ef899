//! Flash geometry - derived layout constants with construction-time checks.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Flash size cannot be 0")]
    ZeroFlashSize,
    #[error("Page size cannot be 0")]
    ZeroPageSize,
    #[error("Page size {page_size} must be a multiple of the 4 byte flash word")]
    UnalignedPageSize { page_size: u32 },
    #[error("Flash size {flash_size} must be larger than page size {page_size}")]
    FlashSmallerThanPage { flash_size: u32, page_size: u32 },
    #[error("Flash size {flash_size} must be a multiple of page size {page_size}")]
    UnalignedFlashSize { flash_size: u32, page_size: u32 },
    #[error("App first page cannot be 0, it would overwrite the bootloader")]
    AppOverlapsBootloader,
    #[error("App first page {app_first_page} must be below page count {num_pages}")]
    AppFirstPageOutOfRange { app_first_page: u32, num_pages: u32 },
    #[error("Flash region {flash_start:#010X}+{flash_size} exceeds the 32 bit address space")]
    FlashEndOverflow { flash_start: u32, flash_size: u32 },
}

/// Immutable flash layout, derived once from four base parameters.
///
/// The last 4 bytes of flash are reserved as the CRC slot holding the
/// expected application checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashGeometry {
    flash_start: u32,
    flash_size: u32,
    page_size: u32,
    app_first_page: u32,
    num_pages: u32,
}

impl FlashGeometry {
    /// Validate the base parameters and derive the layout.
    pub fn new(
        flash_start: u32,
        app_first_page: u32,
        flash_size: u32,
        page_size: u32,
    ) -> Result<Self, GeometryError> {
        if flash_size == 0 {
            return Err(GeometryError::ZeroFlashSize);
        }
        if page_size == 0 {
            return Err(GeometryError::ZeroPageSize);
        }
        // The protocol is word-granular: the staging buffer fills in
        // 4-byte steps and the CRC slot is the last word of a page.
        if page_size % 4 != 0 {
            return Err(GeometryError::UnalignedPageSize { page_size });
        }
        if flash_size <= page_size {
            return Err(GeometryError::FlashSmallerThanPage {
                flash_size,
                page_size,
            });
        }
        if flash_size % page_size != 0 {
            return Err(GeometryError::UnalignedFlashSize {
                flash_size,
                page_size,
            });
        }
        let num_pages = flash_size / page_size;
        if app_first_page == 0 {
            return Err(GeometryError::AppOverlapsBootloader);
        }
        if app_first_page >= num_pages {
            return Err(GeometryError::AppFirstPageOutOfRange {
                app_first_page,
                num_pages,
            });
        }
        // All derived addresses stay representable once the region end
        // fits in u32.
        if flash_start.checked_add(flash_size).is_none() {
            return Err(GeometryError::FlashEndOverflow {
                flash_start,
                flash_size,
            });
        }
        Ok(Self {
            flash_start,
            flash_size,
            page_size,
            app_first_page,
            num_pages,
        })
    }

    pub fn flash_start(&self) -> u32 {
        self.flash_start
    }

    pub fn flash_size(&self) -> u32 {
        self.flash_size
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn app_first_page(&self) -> u32 {
        self.app_first_page
    }

    /// First address of the app region.
    pub fn app_start_address(&self) -> u32 {
        self.flash_start + self.app_first_page * self.page_size
    }

    /// Number of pages in the app region.
    pub fn app_num_pages(&self) -> u32 {
        self.num_pages - self.app_first_page
    }

    /// Address of the 4-byte CRC slot, the last word of flash.
    pub fn crc_slot_address(&self) -> u32 {
        self.flash_start + self.flash_size - 4
    }

    /// Byte length of the region covered by the application CRC.
    ///
    /// The app region minus the trailing CRC slot, so that storing the
    /// checksum does not change the checksummed bytes. Part of the wire
    /// contract: host tooling must checksum the same range.
    pub fn app_crc_region_len(&self) -> u32 {
        self.app_num_pages() * self.page_size - 4
    }

    /// Byte length of the bootloader region.
    pub fn bootloader_len(&self) -> u32 {
        self.app_first_page * self.page_size
    }

    /// Start address of a page.
    pub fn page_address(&self, page_id: u32) -> u32 {
        self.flash_start + page_id * self.page_size
    }

    /// Half-open bounds check: the whole `[address, address + len)` range
    /// must lie inside flash.
    pub fn contains_range(&self, address: u32, len: u32) -> bool {
        address >= self.flash_start
            && address
                .checked_add(len)
                .is_some_and(|end| end <= self.flash_start + self.flash_size)
    }
}
