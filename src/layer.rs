//! The square module grids a symbol is drawn into while it is being built.

/// A square bitmap of modules (`true` = dark), stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    modules: Vec<bool>,
}

impl Grid {
    /// Creates an all-light grid with the given side length.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            modules: vec![false; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the module at the given coordinates, which must be in bounds.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, isdark: bool) {
        let index = self.index(x, y);
        self.modules[index] = isdark;
    }

    /// Counts the dark modules.
    pub fn count_dark(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }

    pub(crate) fn into_modules(self) -> Vec<bool> {
        self.modules
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(x < self.size && y < self.size, "Module coordinates out of bounds");
        y * self.size + x
    }
}

/// The working state of a symbol under construction: the module colors (`canvas`) and the
/// set of function modules that masking and data placement must leave alone (`protection`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub(crate) canvas: Grid,
    pub(crate) protection: Grid,
}

impl Layer {
    pub fn new(size: usize) -> Self {
        Self {
            canvas: Grid::new(size),
            protection: Grid::new(size),
        }
    }

    pub fn size(&self) -> usize {
        self.canvas.size()
    }

    pub fn canvas(&self) -> &Grid {
        &self.canvas
    }

    pub fn protection(&self) -> &Grid {
        &self.protection
    }

    pub fn is_protected(&self, x: usize, y: usize) -> bool {
        self.protection.get(x, y)
    }

    /// Sets the color of a module and marks it as a function module.
    pub fn set_function_module(&mut self, x: usize, y: usize, isdark: bool) {
        self.canvas.set(x, y, isdark);
        self.protection.set(x, y, true);
    }

    /// Like [`Layer::set_function_module`], but silently skips coordinates outside the grid.
    pub fn set_function_module_unbounded(&mut self, x: i32, y: i32, isdark: bool) {
        let range = 0..self.size() as i32;
        if range.contains(&x) && range.contains(&y) {
            self.set_function_module(x as usize, y as usize, isdark);
        }
    }

    /// Drops the protection mask and returns the finished canvas.
    pub fn into_canvas(self) -> Grid {
        self.canvas
    }
}
