// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Parameter sweeps: the full Cartesian product of a command's axes, outer
//! axis first, one exchange per combination.

use std::io::Write;

use tracing::debug;

use crate::{
    control_block::{
        common::{alloc_len_u8, alloc_len_u16, alloc_len_u32, new_cdb},
        mode_sense::{ALL_PAGES, ALL_SUBPAGES, PageControl, fill_mode_sense6, fill_mode_sense10},
        read_defect_data::{
            DEFECT_HEADER_LEN, DefectListSelect, fill_read_defect_data10,
            fill_read_defect_data12,
        },
    },
    transport::ScsiTransport,
    walker::{WalkError, Walker},
};

pub const MODE_SENSE_10_CAPACITY: usize = 4096;
pub const MODE_SENSE_6_CAPACITY: usize = 255;
pub const DEFECT_DATA_CAPACITY: usize = 512;

/// Block descriptor flags of MODE SENSE (10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptors {
    pub llbaa: bool,
    pub dbd: bool,
}

pub const MODE_SENSE_10_DESCRIPTORS: [BlockDescriptors; 4] = [
    BlockDescriptors { llbaa: true, dbd: true },
    BlockDescriptors { llbaa: false, dbd: true },
    BlockDescriptors { llbaa: false, dbd: false },
    BlockDescriptors { llbaa: true, dbd: false },
];

pub const MODE_SENSE_6_DBD: [bool; 2] = [true, false];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectCdbSize {
    Ten,
    Twelve,
}

pub const DEFECT_CDB_SIZES: [DefectCdbSize; 2] = [DefectCdbSize::Ten, DefectCdbSize::Twelve];
pub const DEFECT_LIST_FORMATS: std::ops::Range<u8> = 0..8;
pub const DEFECT_LISTS: [DefectListSelect; 2] = [DefectListSelect::PLIST, DefectListSelect::GLIST];
pub const DEFECT_COUNT_ONLY: [bool; 2] = [true, false];

/// One READ DEFECT DATA combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefectRequest {
    pub size: DefectCdbSize,
    pub format: u8,
    pub lists: DefectListSelect,
    pub count_only: bool,
}

impl DefectRequest {
    /// Header only when counting, otherwise the whole response buffer.
    #[inline]
    pub fn allocation(&self) -> usize {
        if self.count_only {
            DEFECT_HEADER_LEN
        } else {
            DEFECT_DATA_CAPACITY
        }
    }
}

pub fn mode_sense10_combinations() -> impl Iterator<Item = (BlockDescriptors, PageControl)> {
    MODE_SENSE_10_DESCRIPTORS
        .into_iter()
        .flat_map(|bd| PageControl::ALL.into_iter().map(move |pc| (bd, pc)))
}

pub fn mode_sense6_combinations() -> impl Iterator<Item = (bool, PageControl)> {
    MODE_SENSE_6_DBD
        .into_iter()
        .flat_map(|dbd| PageControl::ALL.into_iter().map(move |pc| (dbd, pc)))
}

pub fn defect_combinations() -> impl Iterator<Item = DefectRequest> {
    DEFECT_CDB_SIZES.into_iter().flat_map(|size| {
        DEFECT_LIST_FORMATS.flat_map(move |format| {
            DEFECT_LISTS.into_iter().flat_map(move |lists| {
                DEFECT_COUNT_ONLY.into_iter().map(move |count_only| DefectRequest {
                    size,
                    format,
                    lists,
                    count_only,
                })
            })
        })
    })
}

impl<T: ScsiTransport, W: Write> Walker<'_, T, W> {
    pub async fn mode_sense10_sweep(&mut self) -> Result<(), WalkError> {
        let mut cdb = new_cdb();
        for (bd, pc) in mode_sense10_combinations() {
            debug!(llbaa = bd.llbaa, dbd = bd.dbd, pc = ?pc, "mode sense (10)");
            let len = fill_mode_sense10(
                &mut cdb,
                bd.dbd,
                bd.llbaa,
                pc,
                ALL_PAGES,
                ALL_SUBPAGES,
                alloc_len_u16(MODE_SENSE_10_CAPACITY),
                0,
            );
            self.exchange(&cdb, len, MODE_SENSE_10_CAPACITY).await?;
        }
        Ok(())
    }

    pub async fn mode_sense6_sweep(&mut self) -> Result<(), WalkError> {
        let mut cdb = new_cdb();
        for (dbd, pc) in mode_sense6_combinations() {
            debug!(dbd, pc = ?pc, "mode sense (6)");
            let len = fill_mode_sense6(
                &mut cdb,
                dbd,
                pc,
                ALL_PAGES,
                ALL_SUBPAGES,
                alloc_len_u8(MODE_SENSE_6_CAPACITY),
                0,
            );
            self.exchange(&cdb, len, MODE_SENSE_6_CAPACITY).await?;
        }
        Ok(())
    }

    /// MODE SENSE (10) sweep followed by MODE SENSE (6).
    pub async fn mode_sense_family(&mut self) -> Result<(), WalkError> {
        self.mode_sense10_sweep().await?;
        self.mode_sense6_sweep().await
    }

    pub async fn defect_data_family(&mut self) -> Result<(), WalkError> {
        let mut cdb = new_cdb();
        for req in defect_combinations() {
            let alloc = req.allocation();
            let len = match req.size {
                DefectCdbSize::Ten => {
                    fill_read_defect_data10(&mut cdb, req.lists, req.format, alloc_len_u16(alloc), 0)
                },
                DefectCdbSize::Twelve => {
                    fill_read_defect_data12(&mut cdb, req.lists, req.format, alloc_len_u32(alloc), 0)
                },
            };
            self.exchange(&cdb, len, DEFECT_DATA_CAPACITY).await?;
        }
        Ok(())
    }
}
