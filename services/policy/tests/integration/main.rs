mod helpers;

mod reminder_test;
