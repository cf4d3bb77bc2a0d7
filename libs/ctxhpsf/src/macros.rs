//! Accessor generators for the well-known property set views
//!
//! The macros expand inside the `impl` of a view holding a `ps: PropertySet` and
//! providing `fn section_mut(&mut self) -> &mut Section`.

macro_rules! string_accessors {
    ($($(#[$doc:meta])* $get:ident, $set:ident, $remove:ident => $id:expr;)*) => {$(
        $(#[$doc])*
        pub fn $get(&self) -> Option<&str> {
            self.ps.string_value($id)
        }

        #[doc = concat!("Sets the value returned by [`Self::", stringify!($get), "`]")]
        pub fn $set<S: Into<String>>(&mut self, value: S) {
            self.section_mut().set_value($id, value.into());
        }

        #[doc = concat!("Removes the value returned by [`Self::", stringify!($get), "`]")]
        pub fn $remove(&mut self) {
            self.section_mut().remove_property($id);
        }
    )*};
}

macro_rules! int_accessors {
    ($($(#[$doc:meta])* $get:ident, $set:ident, $remove:ident => $id:expr;)*) => {$(
        $(#[$doc])*
        ///
        /// Returns 0 if unset, see `was_null()`.
        pub fn $get(&self) -> i32 {
            self.ps.int_value($id) as i32
        }

        #[doc = concat!("Sets the value returned by [`Self::", stringify!($get), "`]")]
        pub fn $set(&mut self, value: i32) {
            self.section_mut().set_value($id, value);
        }

        #[doc = concat!("Removes the value returned by [`Self::", stringify!($get), "`]")]
        pub fn $remove(&mut self) {
            self.section_mut().remove_property($id);
        }
    )*};
}

macro_rules! bool_accessors {
    ($($(#[$doc:meta])* $get:ident, $set:ident, $remove:ident => $id:expr;)*) => {$(
        $(#[$doc])*
        ///
        /// Returns false if unset, see `was_null()`.
        pub fn $get(&self) -> bool {
            self.ps.bool_value($id)
        }

        #[doc = concat!("Sets the value returned by [`Self::", stringify!($get), "`]")]
        pub fn $set(&mut self, value: bool) {
            self.section_mut().set_value($id, value);
        }

        #[doc = concat!("Removes the value returned by [`Self::", stringify!($get), "`]")]
        pub fn $remove(&mut self) {
            self.section_mut().remove_property($id);
        }
    )*};
}

macro_rules! datetime_accessors {
    ($($(#[$doc:meta])* $get:ident, $set:ident, $remove:ident => $id:expr;)*) => {$(
        $(#[$doc])*
        pub fn $get(&self) -> Option<time::OffsetDateTime> {
            self.ps.datetime_value($id)
        }

        #[doc = concat!("Sets the value returned by [`Self::", stringify!($get), "`]")]
        pub fn $set(&mut self, value: time::OffsetDateTime) {
            self.section_mut().set_value($id, value);
        }

        #[doc = concat!("Removes the value returned by [`Self::", stringify!($get), "`]")]
        pub fn $remove(&mut self) {
            self.section_mut().remove_property($id);
        }
    )*};
}

pub(crate) use {bool_accessors, datetime_accessors, int_accessors, string_accessors};
