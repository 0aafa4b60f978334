use glam::{UVec2, Vec2};

use crate::types::{MapInfo, PlannerError};

/// Dense row-major 2-D grid. `data[y * width + x]` holds the cell at (x, y).
#[derive(Debug, Clone)]
pub struct Grid2d<T> {
    info: MapInfo,
    data: Vec<T>,
    default_value: T,
}

impl<T: Copy> Grid2d<T> {
    /// Grid with every cell set to `value`. The value is also used when the
    /// grid is resized or a region is reset.
    pub fn filled(info: MapInfo, value: T) -> Self {
        let len = (info.width as usize) * (info.height as usize);
        Self {
            info,
            data: vec![value; len],
            default_value: value,
        }
    }

    pub fn from_data(info: MapInfo, data: Vec<T>, default_value: T) -> Result<Self, PlannerError> {
        let expected_len = (info.width as usize) * (info.height as usize);
        if data.len() != expected_len {
            return Err(PlannerError::InvalidMetadata(format!(
                "data length {} does not match map size {}",
                data.len(),
                expected_len
            )));
        }

        Ok(Self {
            info,
            data,
            default_value,
        })
    }

    pub fn info(&self) -> &MapInfo {
        &self.info
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn get(&self, cell: UVec2) -> Option<&T> {
        if cell.x >= self.info.width || cell.y >= self.info.height {
            return None;
        }
        let idx = self.index(cell);
        Some(&self.data[idx])
    }

    pub fn set(&mut self, cell: UVec2, value: T) -> Result<(), PlannerError> {
        if cell.x >= self.info.width || cell.y >= self.info.height {
            return Err(PlannerError::OutOfBounds(format!(
                "cell ({}, {}) out of bounds for map {}x{}",
                cell.x, cell.y, self.info.width, self.info.height
            )));
        }
        let idx = self.index(cell);
        self.data[idx] = value;
        Ok(())
    }

    fn index(&self, cell: UVec2) -> usize {
        (cell.y as usize) * (self.info.width as usize) + (cell.x as usize)
    }

    /// World coordinate of the cell center.
    pub fn map_to_world(&self, cell: UVec2) -> Vec2 {
        Vec2::new(
            self.info.origin.x + (cell.x as f32 + 0.5) * self.info.resolution,
            self.info.origin.y + (cell.y as f32 + 0.5) * self.info.resolution,
        )
    }

    /// Cell containing the world point, or `None` outside the map.
    pub fn world_to_map(&self, pos: Vec2) -> Option<UVec2> {
        let continuous = self.world_to_map_continuous(pos)?;
        Some(UVec2::new(continuous.x as u32, continuous.y as u32))
    }

    /// Fractional cell coordinates of the world point, or `None` outside the map.
    pub fn world_to_map_continuous(&self, pos: Vec2) -> Option<Vec2> {
        let mx = (pos.x - self.info.origin.x) / self.info.resolution;
        let my = (pos.y - self.info.origin.y) / self.info.resolution;
        if mx < 0.0 || my < 0.0 || mx >= self.info.width as f32 || my >= self.info.height as f32 {
            return None;
        }
        Some(Vec2::new(mx, my))
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Reallocate to a new shape; every cell becomes the default value.
    pub fn resize_map(&mut self, size: UVec2, resolution: f32, origin: Vec2) {
        self.info = MapInfo {
            width: size.x,
            height: size.y,
            resolution,
            origin,
        };
        self.data = vec![self.default_value; (size.x as usize) * (size.y as usize)];
    }

    /// Reset the region [min, max) to the default value.
    pub fn reset_map(&mut self, min: UVec2, max: UVec2) {
        let xn = max.x.min(self.info.width);
        let yn = max.y.min(self.info.height);
        for y in min.y..yn {
            for x in min.x..xn {
                let idx = self.index(UVec2::new(x, y));
                self.data[idx] = self.default_value;
            }
        }
    }

    /// Shift the map origin, keeping data for cells that remain in view.
    /// The new origin is snapped to the cell grid so cell alignment is preserved.
    pub fn update_origin(&mut self, new_origin: Vec2) {
        let res = self.info.resolution;
        let cell_dx = ((new_origin.x - self.info.origin.x) / res).floor() as i32;
        let cell_dy = ((new_origin.y - self.info.origin.y) / res).floor() as i32;
        if cell_dx == 0 && cell_dy == 0 {
            return;
        }

        let width = self.info.width as i32;
        let height = self.info.height as i32;
        let mut shifted = vec![self.default_value; self.data.len()];
        for y in 0..height {
            for x in 0..width {
                let src_x = x + cell_dx;
                let src_y = y + cell_dy;
                if src_x >= 0 && src_x < width && src_y >= 0 && src_y < height {
                    shifted[(y * width + x) as usize] = self.data[(src_y * width + src_x) as usize];
                }
            }
        }
        self.data = shifted;
        self.info.origin.x += cell_dx as f32 * res;
        self.info.origin.y += cell_dy as f32 * res;
    }
}
