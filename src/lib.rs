pub mod shared {
    pub mod core {
        pub mod clock;
    }
    pub mod infrastructure {
        pub mod appointment_service;
    }
}

pub mod modules {
    pub mod schedule {
        pub mod core {
            pub mod appointment;
            pub mod appointment_index;
            pub mod member;
            pub mod phase;
            pub mod render_model;
            pub mod schedule_config;
            pub mod slot;
            pub mod time_slot_grid;
            pub mod week_window;
        }
        pub mod use_cases {
            pub mod decide_error;
            pub mod book_appointment {
                pub mod command;
                pub mod decide;
            }
            pub mod cancel_appointment {
                pub mod command;
                pub mod decide;
            }
        }
        pub mod controller {
            pub mod errors;
            pub mod schedule_controller;
        }
        pub mod adapters {
            pub mod inbound {
                pub mod http;
            }
        }
    }
}

pub mod shell;
